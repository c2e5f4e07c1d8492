//! JWT Claims 및 Identity 변환 코덱.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AuthError, Identity};

/// 발급 시각 claim.
pub const CLAIM_ISSUED_AT: &str = "iat";
/// 만료 시각 claim.
pub const CLAIM_EXPIRES_AT: &str = "exp";
/// 최초 발급 시각 claim (갱신 상한 계산용).
pub const CLAIM_ORIG_ISSUED_AT: &str = "orig_iat";
/// 이름 claim.
pub const CLAIM_FIRST_NAME: &str = "first_name";
/// 성 claim.
pub const CLAIM_LAST_NAME: &str = "last_name";

/// 식별자 키로 사용할 수 없는 claim 이름.
pub const RESERVED_CLAIMS: [&str; 5] = [
    CLAIM_ISSUED_AT,
    CLAIM_EXPIRES_AT,
    CLAIM_ORIG_ISSUED_AT,
    CLAIM_FIRST_NAME,
    CLAIM_LAST_NAME,
];

/// JWT 페이로드.
///
/// claim 이름 → JSON 값 매핑입니다. 식별자 claim의 해석은 [`ClaimsCodec`]만 담당합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// 빈 Claims 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// claim 값 조회.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 문자열 claim 조회.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// claim 설정.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// `iat` (Unix timestamp).
    pub fn issued_at(&self) -> Option<i64> {
        self.get(CLAIM_ISSUED_AT).and_then(Value::as_i64)
    }

    /// `exp` (Unix timestamp).
    pub fn expires_at(&self) -> Option<i64> {
        self.get(CLAIM_EXPIRES_AT).and_then(Value::as_i64)
    }

    /// `orig_iat` (Unix timestamp).
    pub fn original_issued_at(&self) -> Option<i64> {
        self.get(CLAIM_ORIG_ISSUED_AT).and_then(Value::as_i64)
    }
}

/// Identity ↔ Claims 변환기.
#[derive(Debug, Clone)]
pub struct ClaimsCodec {
    identity_key: String,
}

impl ClaimsCodec {
    /// 식별자 claim 키로 코덱 생성.
    pub fn new(identity_key: impl Into<String>) -> Self {
        Self {
            identity_key: identity_key.into(),
        }
    }

    /// 식별자 claim 키.
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    /// Identity를 Claims로 인코딩합니다.
    pub fn encode(&self, identity: &Identity) -> Claims {
        let mut claims = Claims::new();
        claims.insert(self.identity_key.clone(), identity.user_name());
        claims.insert(CLAIM_FIRST_NAME, identity.first_name());
        claims.insert(CLAIM_LAST_NAME, identity.last_name());
        claims
    }

    /// Claims에서 Identity를 복원합니다.
    ///
    /// 이름 claim이 없으면 빈 문자열로 채웁니다.
    ///
    /// # Errors
    ///
    /// 식별자 claim이 없거나, 문자열이 아니거나, 비어 있으면 `InvalidClaims`.
    pub fn decode(&self, claims: &Claims) -> Result<Identity, AuthError> {
        let user_name = claims
            .get_str(&self.identity_key)
            .filter(|name| !name.is_empty())
            .ok_or(AuthError::InvalidClaims)?;

        Ok(Identity::new(
            user_name,
            claims.get_str(CLAIM_FIRST_NAME).unwrap_or_default(),
            claims.get_str(CLAIM_LAST_NAME).unwrap_or_default(),
        ))
    }
}

impl Default for ClaimsCodec {
    fn default() -> Self {
        Self::new("id")
    }
}
