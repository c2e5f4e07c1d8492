//! 앨범 endpoint.
//!
//! - `GET /albums` - 전체 앨범 목록
//! - `POST /albums` - 새 앨범 등록 (201 + `Location`)
//! - `GET /albums/{id}` - 단일 앨범 조회

use std::sync::Arc;

use album_core::{Album, NewAlbum};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{debug, error, info};
use validator::{Validate, ValidationErrors};

use crate::error::{ApiErrorResponse, ApiResult};
use crate::repository::StorageError;
use crate::state::AppState;

fn storage_error(operation: &str, e: StorageError) -> (StatusCode, Json<ApiErrorResponse>) {
    error!(operation, error = %e, "Album storage failure");
    ApiErrorResponse::new("STORAGE_ERROR", "앨범 저장소 처리 중 오류가 발생했습니다")
        .into_error(StatusCode::INTERNAL_SERVER_ERROR)
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

/// 전체 앨범 조회.
///
/// GET /albums
#[utoipa::path(
    get,
    path = "/albums",
    responses(
        (status = 200, description = "앨범 목록", body = Vec<Album>),
        (status = 500, description = "저장소 오류", body = ApiErrorResponse)
    ),
    tag = "albums"
)]
pub async fn list_albums(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Album>>> {
    let albums = state
        .albums
        .list_albums()
        .await
        .map_err(|e| storage_error("list_albums", e))?;

    debug!(count = albums.len(), "GET /albums");
    Ok(Json(albums))
}

/// 새 앨범 등록.
///
/// POST /albums
///
/// 요청 본문의 `id`는 무시되며 저장소가 새 ID를 할당합니다.
#[utoipa::path(
    post,
    path = "/albums",
    request_body = NewAlbum,
    responses(
        (status = 201, description = "등록 성공", body = Album),
        (status = 400, description = "잘못된 본문 또는 검증 실패", body = ApiErrorResponse),
        (status = 500, description = "저장소 오류", body = ApiErrorResponse)
    ),
    tag = "albums"
)]
pub async fn create_album(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewAlbum>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(input) = payload.map_err(|e| {
        ApiErrorResponse::new("INVALID_BODY", e.body_text()).into_error(StatusCode::BAD_REQUEST)
    })?;

    if let Err(errors) = input.validate() {
        return Err(
            ApiErrorResponse::new("VALIDATION_ERROR", validation_message(&errors))
                .into_error(StatusCode::BAD_REQUEST),
        );
    }

    let album = state
        .albums
        .insert_album(input)
        .await
        .map_err(|e| storage_error("insert_album", e))?;

    info!(id = album.id, title = %album.title, "Album created");

    let mut response = (StatusCode::CREATED, Json(&album)).into_response();
    if let Ok(location) = HeaderValue::from_str(&format!("/albums/{}", album.id)) {
        response.headers_mut().insert(LOCATION, location);
    }

    Ok(response)
}

/// 단일 앨범 조회.
///
/// GET /albums/{id}
#[utoipa::path(
    get,
    path = "/albums/{id}",
    params(("id" = i64, Path, description = "앨범 ID")),
    responses(
        (status = 200, description = "앨범", body = Album),
        (status = 400, description = "잘못된 ID", body = ApiErrorResponse),
        (status = 404, description = "앨범 없음", body = ApiErrorResponse),
        (status = 500, description = "저장소 오류", body = ApiErrorResponse)
    ),
    tag = "albums"
)]
pub async fn get_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Album>> {
    let id: i64 = id.parse().map_err(|_| {
        ApiErrorResponse::simple("INVALID_ID", format!("invalid album id: {}", id))
            .into_error(StatusCode::BAD_REQUEST)
    })?;

    state
        .albums
        .get_album(id)
        .await
        .map_err(|e| storage_error("get_album", e))?
        .map(Json)
        .ok_or_else(|| {
            ApiErrorResponse::simple("NOT_FOUND", "album not found").into_error(StatusCode::NOT_FOUND)
        })
}

/// 앨범 라우터 생성.
pub fn albums_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_albums).post(create_album))
        .route("/{id}", get(get_album))
}
