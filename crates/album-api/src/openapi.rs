//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use album_core::{Album, NewAlbum};

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, HealthResponse, HelloResponse, LoginRequest,
    LogoutResponse, PingResponse, TokenResponse,
};

// ==================== OpenAPI 문서 정의 ====================

/// Bearer 토큰 보안 스킴 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Album API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Album API",
        description = r#"
# 앨범 컬렉션 REST API

레코드 앨범 목록을 관리하고 JWT 인증 흐름을 제공합니다.

## 인증

`POST /login`으로 받은 토큰을 다음 중 하나로 전달합니다 (조회 순서대로):

- `Authorization: Bearer <token>` 헤더
- `token` 쿼리 파라미터
- `jwt` 쿠키

토큰은 최초 발급 후 최대 갱신 시간 이내에 `GET /refresh_token`으로 재발급할 수 있습니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "albums", description = "앨범 - 목록/등록/조회"),
        (name = "auth", description = "인증 - 로그인, 토큰 갱신, 보호 endpoint")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
            PingResponse,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Albums =====
            Album,
            NewAlbum,

            // ===== Auth =====
            LoginRequest,
            TokenResponse,
            LogoutResponse,
            HelloResponse,
        )
    ),
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::health::ping,

        // ===== Albums =====
        crate::routes::albums::list_albums,
        crate::routes::albums::create_album,
        crate::routes::albums::get_album,

        // ===== Auth =====
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::refresh_token,
        crate::routes::hello::hello,
    )
)]
pub struct ApiDoc;

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("Album API"));

        // 태그 확인
        assert!(json.contains("health"));
        assert!(json.contains("albums"));
        assert!(json.contains("auth"));

        // 경로 확인
        assert!(json.contains("/health/ready"));
        assert!(json.contains("/albums/{id}"));
        assert!(json.contains("/login"));
        assert!(json.contains("/refresh_token"));
        assert!(json.contains("/hello"));
        assert!(json.contains("bearer_auth"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        assert!(json.contains("HealthResponse"));
        assert!(json.contains("NewAlbum"));
        assert!(json.contains("TokenResponse"));
        assert!(json.contains("ApiErrorResponse"));
    }
}
