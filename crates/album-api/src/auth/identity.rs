//! 인증된 사용자 식별 정보.

use serde::{Deserialize, Serialize};

/// 인증된 주체(principal).
///
/// 자격증명 검증 성공 시, 또는 토큰 Claims 디코딩 시에만 생성됩니다.
/// 생성 이후에는 변경할 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_name: String,
    first_name: String,
    last_name: String,
}

impl Identity {
    /// 새 Identity 생성.
    pub fn new(
        user_name: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// 로그인 ID (토큰의 식별자 claim 값).
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// 이름.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// 성.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_name)
    }
}
