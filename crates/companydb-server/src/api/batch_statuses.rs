//! Batch status handlers. Batches are addressed by their external id.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use companydb_db::{BatchStatusRow, BatchStatusUpdate, NewBatchStatus};

use crate::middleware::RequestId;

use super::{
    map_db_error, map_write_error, normalize_limit, ApiError, ApiResponse, AppState, ListQuery,
    ResponseMeta,
};

pub(super) async fn list_batch_statuses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<BatchStatusRow>>>, ApiError> {
    let data = companydb_db::list_batch_statuses(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_batch_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewBatchStatus>,
) -> Result<(StatusCode, Json<ApiResponse<BatchStatusRow>>), ApiError> {
    if body.batch_id.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "batch_id must not be empty",
        ));
    }

    let data = companydb_db::create_batch_status(&state.pool, &body)
        .await
        .map_err(|e| map_write_error(&req_id.0, "batch status", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_batch_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(batch_id): Path<String>,
) -> Result<Json<ApiResponse<BatchStatusRow>>, ApiError> {
    let data = companydb_db::get_batch_status(&state.pool, &batch_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "batch", &batch_id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn update_batch_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(batch_id): Path<String>,
    Json(body): Json<BatchStatusUpdate>,
) -> Result<Json<ApiResponse<BatchStatusRow>>, ApiError> {
    let data = companydb_db::update_batch_status(&state.pool, &batch_id, &body)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "batch", &batch_id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
