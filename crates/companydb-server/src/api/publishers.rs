use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use companydb_db::{NewPublisher, PublisherRow, PublisherUpdate};

use crate::middleware::RequestId;

use super::{
    deleted, map_db_error, map_write_error, normalize_limit, ApiError, ApiResponse, AppState,
    Deleted, ListQuery, ResponseMeta,
};

pub(super) async fn list_publishers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<PublisherRow>>>, ApiError> {
    let data = companydb_db::list_publishers(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_publisher(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewPublisher>,
) -> Result<(StatusCode, Json<ApiResponse<PublisherRow>>), ApiError> {
    let data = companydb_db::create_publisher(&state.pool, &body)
        .await
        .map_err(|e| map_write_error(&req_id.0, "publisher", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_publisher(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PublisherRow>>, ApiError> {
    let data = companydb_db::get_publisher(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "publisher", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn update_publisher(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<PublisherUpdate>,
) -> Result<Json<ApiResponse<PublisherRow>>, ApiError> {
    let data = companydb_db::update_publisher(&state.pool, id, &body)
        .await
        .map_err(|e| map_write_error(&req_id.0, "publisher", &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "publisher", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/publishers/{id} — removes its articles, sentiments and batches too.
pub(super) async fn delete_publisher(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let found = companydb_db::delete_publisher(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    deleted(req_id, "publisher", id, found)
}
