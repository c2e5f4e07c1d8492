//! 인증 에러 및 HTTP 응답 변환.
//!
//! 모든 인증 실패는 고정된 상태 코드와 일반 메시지로만 응답합니다.
//! 실패 사유(서명 불일치, 만료 등)는 로그와 메트릭에만 남고 응답 본문에는 포함되지 않습니다.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ApiErrorResponse;

/// 인증/인가 에러.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("아이디 또는 비밀번호가 누락되었습니다")]
    MissingLoginValues,
    #[error("아이디 또는 비밀번호가 올바르지 않습니다")]
    FailedAuthentication,
    #[error("인증 토큰이 필요합니다")]
    TokenMissing,
    #[error("유효하지 않은 토큰")]
    TokenInvalid,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("토큰 갱신 가능 기간이 지났습니다")]
    RefreshExpired,
    #[error("토큰 Claims 형식이 올바르지 않습니다")]
    InvalidClaims,
    #[error("권한이 부족합니다")]
    Forbidden,
    #[error("인증 서비스 내부 오류")]
    Internal,
}

impl AuthError {
    /// 에러에 대응하는 HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// 로그/메트릭 라벨용 사유 코드.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingLoginValues => "missing_login_values",
            AuthError::FailedAuthentication => "failed_authentication",
            AuthError::TokenMissing => "token_missing",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::RefreshExpired => "refresh_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::Forbidden => "forbidden",
            AuthError::Internal => "internal",
        }
    }
}

/// 인증 실패 응답.
///
/// 401 응답에는 `WWW-Authenticate: JWT realm="..."` 헤더가 붙습니다.
#[derive(Debug)]
pub struct AuthRejection {
    error: AuthError,
    realm: Option<String>,
}

impl AuthRejection {
    /// realm을 포함한 거절 응답 생성.
    pub fn new(error: AuthError, realm: impl Into<String>) -> Self {
        Self {
            error,
            realm: Some(realm.into()),
        }
    }

    /// 원인 에러.
    pub fn error(&self) -> AuthError {
        self.error
    }
}

impl From<AuthError> for AuthRejection {
    fn from(error: AuthError) -> Self {
        Self { error, realm: None }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = match status {
            StatusCode::FORBIDDEN => {
                ApiErrorResponse::simple("FORBIDDEN", "이 작업을 수행할 권한이 없습니다")
            }
            StatusCode::UNAUTHORIZED => ApiErrorResponse::simple("UNAUTHORIZED", "인증이 필요합니다"),
            _ => ApiErrorResponse::simple("INTERNAL_ERROR", "요청을 처리할 수 없습니다"),
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Some(realm) = self.realm {
                if let Ok(value) = HeaderValue::from_str(&format!("JWT realm=\"{}\"", realm)) {
                    response.headers_mut().insert(WWW_AUTHENTICATE, value);
                }
            }
        }

        response
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        AuthRejection::from(self).into_response()
    }
}
