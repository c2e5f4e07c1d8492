//! 앨범 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 앨범 REST API
//! - JWT 인증 (로그인, 토큰 갱신, 관리자 게이트)
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증 및 권한 관리
//! - [`repository`]: 앨범 저장소 (PostgreSQL, 인메모리)
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    AdminAuth, AuthConfig, AuthError, Claims, CredentialVerifier, Credentials, Identity, JwtAuth,
    StaticCredentialVerifier, TokenService,
};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::{AlbumStore, InMemoryAlbumStore, PgAlbumStore};
pub use routes::create_api_router;
pub use state::AppState;
