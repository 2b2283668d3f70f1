use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use companydb_db::{NewSentiment, SentimentRow, SentimentUpdate};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    deleted, map_db_error, map_write_error, normalize_limit, ApiError, ApiResponse, AppState,
    Deleted, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct SentimentQuery {
    pub brand_id: Option<i64>,
    pub limit: Option<i64>,
}

pub(super) async fn list_sentiments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SentimentQuery>,
) -> Result<Json<ApiResponse<Vec<SentimentRow>>>, ApiError> {
    let data = companydb_db::list_sentiments(
        &state.pool,
        query.brand_id,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewSentiment>,
) -> Result<(StatusCode, Json<ApiResponse<SentimentRow>>), ApiError> {
    let data = companydb_db::create_sentiment(&state.pool, &body)
        .await
        .map_err(|e| map_write_error(&req_id.0, "sentiment", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SentimentRow>>, ApiError> {
    let data = companydb_db::get_sentiment(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "sentiment", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/sentiments/{id} — brand ownership only changes through brand reconciliation.
pub(super) async fn update_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<SentimentUpdate>,
) -> Result<Json<ApiResponse<SentimentRow>>, ApiError> {
    let data = companydb_db::update_sentiment(&state.pool, id, &body)
        .await
        .map_err(|e| map_write_error(&req_id.0, "sentiment", &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "sentiment", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let found = companydb_db::delete_sentiment(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    deleted(req_id, "sentiment", id, found)
}
