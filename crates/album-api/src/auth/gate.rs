//! 인가 게이트.
//!
//! 인증(토큰당 한 번)과 분리된 보호 작업별 권한 판정.

use serde::{Deserialize, Serialize};

use super::{AuthError, Identity};

/// 관리자 계정 이름.
pub const ADMIN_USER_NAME: &str = "admin";

/// 보호 작업이 요구하는 권한.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// 관리자 전용
    Admin,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Admin => write!(f, "admin"),
        }
    }
}

/// Identity가 해당 권한을 가지는지 확인.
pub fn authorize(identity: &Identity, capability: Capability) -> bool {
    match capability {
        Capability::Admin => identity.user_name() == ADMIN_USER_NAME,
    }
}

/// 권한이 없으면 `Forbidden`을 반환합니다.
pub fn require_capability(identity: &Identity, capability: Capability) -> Result<(), AuthError> {
    if authorize(identity, capability) {
        Ok(())
    } else {
        tracing::debug!(user = identity.user_name(), %capability, "Authorization denied");
        Err(AuthError::Forbidden)
    }
}
