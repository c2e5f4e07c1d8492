//! 인증 및 권한 부여.
//!
//! JWT 기반 인증과 관리자 권한 게이트를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`CredentialVerifier`]: 아이디/비밀번호 검증 (기본 구현: [`StaticCredentialVerifier`])
//! - [`ClaimsCodec`]: Identity ↔ Claims 변환
//! - [`TokenService`]: 토큰 발급/검증/갱신 및 요청에서 토큰 추출
//! - [`authorize`]: 보호 작업별 권한 판정
//! - [`JwtAuth`], [`AdminAuth`]: Axum 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(AdminAuth(auth): AdminAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", auth.identity.user_name())
//! }
//! ```

mod claims;
mod config;
mod credentials;
mod error;
mod gate;
mod identity;
mod jwt;
mod lookup;
mod middleware;

pub use claims::{Claims, ClaimsCodec};
pub use config::{AuthConfig, CookieSettings, TokenSource};
pub use credentials::{
    hash_password, verify_password, CredentialVerifier, Credentials, PasswordError,
    StaticCredentialVerifier,
};
pub use error::{AuthError, AuthRejection};
pub use gate::{authorize, require_capability, Capability, ADMIN_USER_NAME};
pub use identity::Identity;
pub use jwt::{IssuedToken, TokenService, VerifiedToken};
pub use lookup::extract_token;
pub use middleware::{AdminAuth, AuthProvider, JwtAuth};
