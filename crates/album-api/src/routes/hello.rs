//! 보호 endpoint 예시.
//!
//! `GET /hello`는 관리자 토큰으로만 접근할 수 있습니다.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AdminAuth, AuthProvider};
use crate::state::AppState;

/// `/hello` 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HelloResponse {
    /// 토큰의 식별자 claim 값
    #[serde(rename = "userID")]
    pub user_id: String,
    /// 인증된 사용자 이름
    #[serde(rename = "userName")]
    pub user_name: String,
    pub text: String,
}

/// 인사 메시지.
///
/// GET /hello
#[utoipa::path(
    get,
    path = "/hello",
    responses(
        (status = 200, description = "관리자 인증 성공", body = HelloResponse),
        (status = 401, description = "토큰 없음, 유효하지 않음, 또는 만료", body = crate::error::ApiErrorResponse),
        (status = 403, description = "관리자 권한 없음", body = crate::error::ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn hello(
    State(state): State<Arc<AppState>>,
    AdminAuth(auth): AdminAuth,
) -> Json<HelloResponse> {
    let user_id = state
        .token_service()
        .and_then(|tokens| auth.claims.get_str(tokens.codec().identity_key()))
        .unwrap_or_default()
        .to_string();

    Json(HelloResponse {
        user_id,
        user_name: auth.identity.user_name().to_string(),
        text: "Hello World.".to_string(),
    })
}

/// 보호 라우터 생성.
pub fn hello_router() -> Router<Arc<AppState>> {
    Router::new().route("/hello", get(hello))
}
