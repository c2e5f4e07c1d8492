//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/ping` - 연결 확인
//! - `/albums` - 앨범 목록/등록/조회
//! - `/login`, `/logout`, `/refresh_token` - 인증 (인증 활성화 시)
//! - `/hello` - 관리자 전용 보호 endpoint (인증 활성화 시)

pub mod albums;
pub mod auth;
pub mod health;
pub mod hello;

pub use albums::albums_router;
pub use auth::{auth_router, LoginCredentials, LoginRequest, LogoutResponse, TokenResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse, PingResponse};
pub use hello::{hello_router, HelloResponse};

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
///
/// # Arguments
///
/// * `with_auth` - 인증 라우트(`/login`, `/logout`, `/refresh_token`, `/hello`) 포함 여부
pub fn create_api_router(with_auth: bool) -> Router<Arc<AppState>> {
    let router = Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        .route("/ping", get(health::ping))
        // 앨범 리소스
        .nest("/albums", albums_router());

    if with_auth {
        router.merge(auth_router()).merge(hello_router())
    } else {
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::state::create_test_state;

    #[tokio::test]
    async fn test_auth_routes_not_mounted_when_disabled() {
        let app = create_api_router(false).with_state(Arc::new(AppState::in_memory()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hello_mounted_when_enabled() {
        let app = create_api_router(true).with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
