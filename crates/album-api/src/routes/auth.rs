//! 인증 endpoint.
//!
//! 로그인, 로그아웃, 토큰 갱신을 제공합니다.
//!
//! - `POST /login` - 아이디/비밀번호로 토큰 발급 (JSON 또는 form)
//! - `POST /logout` - 토큰 쿠키 삭제
//! - `GET /refresh_token` - 갱신 가능 기간 내 토큰 재발급

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request, State},
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::{
    AuthError, AuthRejection, CookieSettings, Credentials, IssuedToken, TokenService,
};
use crate::metrics;
use crate::state::{AppState, AuthServices};

// ==================== 요청/응답 타입 ====================

/// 로그인 요청 본문.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// 로그인 ID
    pub username: String,
    /// 비밀번호
    pub password: String,
}

/// 토큰 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// 서명된 JWT
    pub token: String,
    /// 만료 시각 (RFC 3339)
    pub expire: String,
}

impl From<&IssuedToken> for TokenResponse {
    fn from(issued: &IssuedToken) -> Self {
        Self {
            token: issued.token.clone(),
            expire: issued.expire.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// 로그아웃 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

/// 로그인 자격증명 추출기.
///
/// `Content-Type`에 따라 JSON 또는 form 본문을 읽습니다.
/// 본문을 해석할 수 없으면 `MissingLoginValues`로 거절합니다.
#[derive(Debug)]
pub struct LoginCredentials(pub Credentials);

impl<S> FromRequest<S> for LoginCredentials
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let credentials = if content_type.starts_with("application/x-www-form-urlencoded") {
            Form::<Credentials>::from_request(req, state)
                .await
                .map(|Form(c)| c)
                .map_err(|_| AuthError::MissingLoginValues)?
        } else {
            Json::<Credentials>::from_request(req, state)
                .await
                .map(|Json(c)| c)
                .map_err(|_| AuthError::MissingLoginValues)?
        };

        Ok(LoginCredentials(credentials))
    }
}

// ==================== 쿠키 ====================

fn token_cookie(cookie: &CookieSettings, value: &str, max_age_secs: i64) -> Option<HeaderValue> {
    let mut header = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        cookie.name,
        value,
        max_age_secs.max(0)
    );
    if cookie.http_only {
        header.push_str("; HttpOnly");
    }
    if cookie.secure {
        header.push_str("; Secure");
    }
    HeaderValue::from_str(&header).ok()
}

fn token_response(tokens: &TokenService, issued: &IssuedToken) -> Response {
    let mut response = Json(TokenResponse::from(issued)).into_response();

    let cookie = &tokens.config().cookie;
    if cookie.send_cookie {
        let max_age = (issued.expire - Utc::now()).num_seconds();
        if let Some(value) = token_cookie(cookie, &issued.token, max_age) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

fn auth_services(state: &AppState) -> Result<&AuthServices, AuthRejection> {
    state.auth.as_ref().ok_or_else(|| {
        tracing::error!("Auth route called without configured auth services");
        AuthRejection::from(AuthError::Internal)
    })
}

// ==================== 핸들러 ====================

/// 로그인.
///
/// POST /login
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginRequest, description = "JSON 또는 form 본문"),
    responses(
        (status = 200, description = "토큰 발급", body = TokenResponse),
        (status = 401, description = "인증 실패", body = crate::error::ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    credentials: Result<LoginCredentials, AuthError>,
) -> Result<Response, AuthRejection> {
    let services = auth_services(&state)?;
    let realm = services.tokens.config().realm.clone();

    let result = match credentials {
        Ok(LoginCredentials(credentials)) => {
            let outcome = services.verifier.authenticate(&credentials).await;
            if let Err(e) = &outcome {
                info!(user = %credentials.username, reason = e.reason(), "Login failed");
            }
            outcome
        }
        Err(e) => Err(e),
    };

    let identity = result.map_err(|e| {
        metrics::record_login(e.reason());
        AuthRejection::new(e, realm.clone())
    })?;

    let issued = services
        .tokens
        .issue(&identity, Utc::now())
        .map_err(|e| AuthRejection::new(e, realm))?;

    metrics::record_login("success");
    info!(user = identity.user_name(), "Login succeeded");

    Ok(token_response(&services.tokens, &issued))
}

/// 로그아웃.
///
/// POST /logout
///
/// 서버 측 토큰 폐기는 하지 않으며, 쿠키 전송이 켜져 있으면 토큰 쿠키를 삭제합니다.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "로그아웃", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, AuthRejection> {
    let services = auth_services(&state)?;

    let mut response = (
        StatusCode::OK,
        Json(LogoutResponse {
            message: "logged out".to_string(),
        }),
    )
        .into_response();

    let cookie = &services.tokens.config().cookie;
    if cookie.send_cookie {
        if let Some(value) = token_cookie(cookie, "", 0) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    Ok(response)
}

/// 토큰 갱신.
///
/// GET /refresh_token
///
/// 기존 토큰의 만료와 관계없이 최초 발급 후 최대 갱신 시간 이내라면 새 토큰을 발급합니다.
#[utoipa::path(
    get,
    path = "/refresh_token",
    responses(
        (status = 200, description = "토큰 재발급", body = TokenResponse),
        (status = 401, description = "토큰 없음, 유효하지 않음, 또는 갱신 기간 초과", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AuthRejection> {
    let services = auth_services(&state)?;
    let tokens = &services.tokens;

    let issued = tokens
        .extract(&headers, &uri)
        .and_then(|token| tokens.refresh(&token, Utc::now()))
        .map_err(|e| {
            if e == AuthError::RefreshExpired {
                warn!("Token refresh attempted after max refresh window");
            }
            tokens.reject(e)
        })?;

    Ok(token_response(tokens, &issued))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh_token", get(refresh_token))
}
