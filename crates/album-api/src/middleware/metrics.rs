//! HTTP 요청 metrics middleware.
//!
//! 요청을 라우트 그룹으로 분류해 라벨을 붙이고, 401/403 응답은 별도로 집계합니다.
//! `/metrics` 스크레이프 요청 자체는 기록하지 않습니다.

use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{
    normalize_path, record_http_denied, record_http_duration, record_http_request,
    record_http_response,
};

/// 메트릭 라벨용 라우트 그룹.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    Albums,
    /// `/login`, `/logout`, `/refresh_token`
    Auth,
    /// 토큰이 필요한 endpoint (`/hello`)
    Protected,
    /// `/health`, `/ping`
    Health,
    /// Swagger UI, OpenAPI JSON
    Docs,
    /// Prometheus 스크레이프
    Metrics,
    Other,
}

impl RouteGroup {
    /// 요청 경로로 그룹을 판별합니다.
    pub fn classify(path: &str) -> Self {
        let first = path.trim_start_matches('/').split('/').next().unwrap_or_default();
        match first {
            "albums" => Self::Albums,
            "login" | "logout" | "refresh_token" => Self::Auth,
            "hello" => Self::Protected,
            "health" | "ping" => Self::Health,
            "swagger-ui" | "api-docs" => Self::Docs,
            "metrics" => Self::Metrics,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Albums => "albums",
            Self::Auth => "auth",
            Self::Protected => "protected",
            Self::Health => "health",
            Self::Docs => "docs",
            Self::Metrics => "metrics",
            Self::Other => "other",
        }
    }

    /// `path` 라벨 값.
    ///
    /// 알 수 없는 경로와 문서 자산은 하나의 값으로 묶고, 앨범 ID는 숫자가 아니어도
    /// `:id`로 치환합니다.
    pub fn path_label(&self, path: &str) -> String {
        match self {
            Self::Other => "other".to_string(),
            Self::Docs => "docs".to_string(),
            Self::Albums => {
                if path.trim_matches('/').split('/').count() > 1 {
                    "/albums/:id".to_string()
                } else {
                    "/albums".to_string()
                }
            }
            _ => normalize_path(path),
        }
    }
}

/// 요청이 자격 증명을 싣고 있는지 (토큰 헤더, 쿠키, 쿼리 문자열, 로그인 본문).
fn carries_credentials(request: &Request, group: RouteGroup) -> bool {
    let headers = request.headers();
    headers.contains_key(header::AUTHORIZATION)
        || headers.contains_key(header::COOKIE)
        || request.uri().query().is_some_and(|q| !q.is_empty())
        || (group == RouteGroup::Auth && request.method() == Method::POST)
}

/// HTTP 메트릭을 수집하는 미들웨어 레이어.
///
/// - `http_requests_total`: 총 요청 수 (group, method, path 라벨)
/// - `http_responses_total`: 총 응답 수 (group, method, path, status 라벨)
/// - `http_request_duration_seconds`: 처리 시간 히스토그램 (group, method 라벨)
/// - `http_denied_total`: 401/403 응답 수 (group, status, credentials 라벨)
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let group = RouteGroup::classify(request.uri().path());
    if group == RouteGroup::Metrics {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().to_string();
    let path = group.path_label(request.uri().path());
    let credentials = carries_credentials(&request, group);

    record_http_request(group.as_str(), &method, &path);

    let response = next.run(request).await;

    let status = response.status();
    record_http_response(group.as_str(), &method, &path, status.as_u16());
    record_http_duration(group.as_str(), &method, start.elapsed().as_secs_f64());

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        record_http_denied(group.as_str(), status.as_u16(), credentials);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Request},
        middleware,
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn unauthorized_handler() -> Response {
        let mut response = StatusCode::UNAUTHORIZED.into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("JWT realm=\"album zone\""),
        );
        response
    }

    fn app() -> Router {
        Router::new()
            .route("/albums/{id}", get(ok_handler))
            .route("/hello", get(unauthorized_handler))
            .route("/login", post(ok_handler))
            .route("/metrics", get(ok_handler))
            .layer(middleware::from_fn(metrics_layer))
    }

    #[test]
    fn test_classify() {
        assert_eq!(RouteGroup::classify("/albums"), RouteGroup::Albums);
        assert_eq!(RouteGroup::classify("/albums/7"), RouteGroup::Albums);
        assert_eq!(RouteGroup::classify("/login"), RouteGroup::Auth);
        assert_eq!(RouteGroup::classify("/refresh_token"), RouteGroup::Auth);
        assert_eq!(RouteGroup::classify("/hello"), RouteGroup::Protected);
        assert_eq!(RouteGroup::classify("/health/ready"), RouteGroup::Health);
        assert_eq!(RouteGroup::classify("/ping"), RouteGroup::Health);
        assert_eq!(RouteGroup::classify("/swagger-ui/index.html"), RouteGroup::Docs);
        assert_eq!(RouteGroup::classify("/metrics"), RouteGroup::Metrics);
        assert_eq!(RouteGroup::classify("/"), RouteGroup::Other);
        assert_eq!(RouteGroup::classify("/wp-admin/setup.php"), RouteGroup::Other);
    }

    #[test]
    fn test_path_label_is_bounded() {
        assert_eq!(RouteGroup::Albums.path_label("/albums"), "/albums");
        assert_eq!(RouteGroup::Albums.path_label("/albums/42"), "/albums/:id");
        assert_eq!(RouteGroup::Albums.path_label("/albums/abc"), "/albums/:id");
        assert_eq!(RouteGroup::Health.path_label("/health/ready"), "/health/ready");
        assert_eq!(RouteGroup::Docs.path_label("/swagger-ui/x.js"), "docs");
        assert_eq!(RouteGroup::Other.path_label("/random/123"), "other");
    }

    #[test]
    fn test_carries_credentials() {
        let bare = Request::builder().uri("/hello").body(Body::empty()).unwrap();
        assert!(!carries_credentials(&bare, RouteGroup::Protected));

        let bearer = Request::builder()
            .uri("/hello")
            .header(header::AUTHORIZATION, "Bearer x")
            .body(Body::empty())
            .unwrap();
        assert!(carries_credentials(&bearer, RouteGroup::Protected));

        let query = Request::builder()
            .uri("/hello?token=x")
            .body(Body::empty())
            .unwrap();
        assert!(carries_credentials(&query, RouteGroup::Protected));

        let login = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .body(Body::empty())
            .unwrap();
        assert!(carries_credentials(&login, RouteGroup::Auth));
    }

    #[tokio::test]
    async fn test_middleware_passes_responses_through() {
        let response = app()
            .oneshot(Request::builder().uri("/albums/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app()
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_denied_response_keeps_headers() {
        let response = app()
            .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "JWT realm=\"album zone\""
        );
    }

    #[tokio::test]
    async fn test_metrics_scrape_is_not_recorded() {
        let response = app()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
