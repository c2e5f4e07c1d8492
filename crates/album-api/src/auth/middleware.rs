//! Axum용 JWT 인증 추출기.
//!
//! 핸들러 인자로 [`JwtAuth`] 또는 [`AdminAuth`]를 받으면 토큰 검증(및 인가)이
//! 핸들러 실행 전에 끝납니다.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;

use super::{require_capability, AuthError, AuthRejection, Capability, Claims, Identity, TokenService};

/// 추출기가 토큰 서비스를 얻을 수 있는 상태.
///
/// 인증이 비활성화된 상태에서는 `None`을 반환합니다.
pub trait AuthProvider {
    fn token_service(&self) -> Option<&TokenService>;
}

impl<T: AuthProvider> AuthProvider for Arc<T> {
    fn token_service(&self) -> Option<&TokenService> {
        (**self).token_service()
    }
}

impl AuthProvider for TokenService {
    fn token_service(&self) -> Option<&TokenService> {
        Some(self)
    }
}

/// JWT 인증 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(auth: JwtAuth) -> impl IntoResponse {
///     format!("Authenticated user: {}", auth.identity.user_name())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth {
    /// 토큰에서 복원한 사용자
    pub identity: Identity,
    /// 검증된 Claims
    pub claims: Claims,
}

impl<S> FromRequestParts<S> for JwtAuth
where
    S: AuthProvider + Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(tokens) = state.token_service() else {
            tracing::error!("JWT extractor used without a configured token service");
            return Err(AuthRejection::from(AuthError::Internal));
        };

        let verified = tokens
            .extract(&parts.headers, &parts.uri)
            .and_then(|token| tokens.verify(&token, Utc::now()))
            .map_err(|e| tokens.reject(e))?;

        Ok(JwtAuth {
            identity: verified.identity,
            claims: verified.claims,
        })
    }
}

/// 관리자 권한을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub JwtAuth);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: AuthProvider + Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = JwtAuth::from_request_parts(parts, state).await?;

        if let Err(e) = require_capability(&auth.identity, Capability::Admin) {
            let rejection = match state.token_service() {
                Some(tokens) => tokens.reject(e),
                None => AuthRejection::from(e),
            };
            return Err(rejection);
        }

        Ok(AdminAuth(auth))
    }
}
