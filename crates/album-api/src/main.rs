//! 앨범 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 헬스 체크, 앨범 목록/등록/조회, JWT 인증 엔드포인트를 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use album_api::auth::{AuthConfig, StaticCredentialVerifier, TokenService};
use album_api::metrics::setup_metrics_recorder;
use album_api::middleware::metrics_layer;
use album_api::openapi::swagger_ui_router;
use album_api::repository::{AlbumStore, InMemoryAlbumStore, PgAlbumStore};
use album_api::routes::create_api_router;
use album_api::state::AppState;
use album_core::{init_logging, AppConfig, AuthSettings, DatabaseConfig, LogConfig, ServerConfig};

/// CORS 레이어 생성.
///
/// `server.cors_origins`가 비어 있으면 모든 origin을 허용합니다 (개발용).
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = server
        .cors_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    } else {
        if !server.cors_origins.is_empty() {
            warn!("cors_origins contains no valid origins, allowing any");
        } else {
            warn!("cors_origins not set, allowing any origin (development mode)");
        }
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        // 허용되는 HTTP 메서드
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        // 허용되는 헤더
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 자격 증명(쿠키) 포함 허용 (origin 제한 시에만)
        .allow_credentials(restricted)
        // preflight 요청 캐시 시간
        .max_age(Duration::from_secs(3600))
}

async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 앨범 저장소 생성.
///
/// 데이터베이스 URL이 설정되어 있으면 PostgreSQL에 연결하고(실패 시 시작 중단),
/// 없으면 샘플 데이터가 들어 있는 인메모리 저장소를 사용합니다.
async fn build_album_store(database: &DatabaseConfig) -> anyhow::Result<Arc<dyn AlbumStore>> {
    match &database.url {
        Some(url) => {
            let store = PgAlbumStore::connect(url, database)
                .await
                .context("데이터베이스 연결 실패")?;
            info!(
                max_connections = database.max_connections,
                "Connected to PostgreSQL album store"
            );
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory album store with sample data");
            Ok(Arc::new(InMemoryAlbumStore::seeded()))
        }
    }
}

/// 인증 구성 요소를 AppState에 연결합니다.
///
/// 설정 오류(빈 서명 키, 잘못된 시간 값, 조회 문자열, 알고리즘)는 시작을 중단시킵니다.
fn attach_auth(state: AppState, settings: &AuthSettings) -> anyhow::Result<AppState> {
    let config = AuthConfig::try_from(settings).context("인증 설정 오류")?;
    info!(
        realm = %config.realm,
        timeout_secs = config.timeout.num_seconds(),
        max_refresh_secs = config.max_refresh.num_seconds(),
        algorithm = ?config.algorithm,
        "JWT authentication enabled"
    );

    let tokens = TokenService::new(config).context("토큰 서비스 생성 실패")?;
    let verifier =
        StaticCredentialVerifier::new(&settings.users).context("계정 비밀번호 해싱 실패")?;

    if verifier.is_empty() {
        warn!("No user accounts configured, every login will fail");
    }

    Ok(state.with_auth(Arc::new(tokens), Arc::new(verifier)))
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    server: &ServerConfig,
) -> Router {
    let with_auth = state.has_auth();

    // 메트릭 라우터 (별도 상태)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router(with_auth).with_state(state))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ))
        .layer(cors_layer(server))
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그가 있으면 OpenAPI JSON 스펙을 stdout으로 출력합니다.
fn export_openapi_requested() -> anyhow::Result<bool> {
    use album_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    if !std::env::args().any(|arg| arg == "--export-openapi") {
        return Ok(false);
    }

    let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
    println!("{}", json);
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (없어도 무시)
    let _ = dotenvy::dotenv();

    if export_openapi_requested()? {
        return Ok(());
    }

    let config = AppConfig::load_default().context("설정 로드 실패")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting album API server");

    let metrics_handle = setup_metrics_recorder().context("Prometheus 레코더 설치 실패")?;
    let addr = config.server.socket_addr()?;

    let albums = build_album_store(&config.database).await?;
    info!(backend = albums.backend(), "Album store ready");

    let mut state = AppState::new(albums);
    if config.auth.enabled {
        state = attach_auth(state, &config.auth)?;
    } else {
        warn!("Authentication disabled, /login, /refresh_token and /hello are not mounted");
    }

    let app = create_router(Arc::new(state), metrics_handle, &config.server);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("{} 바인딩 실패", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
