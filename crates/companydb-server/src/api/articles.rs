use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use companydb_db::{ArticleRow, ArticleUpdate, NewArticle};

use crate::middleware::RequestId;

use super::{
    deleted, map_db_error, map_write_error, normalize_limit, ApiError, ApiResponse, AppState,
    Deleted, ListQuery, ResponseMeta,
};

pub(super) async fn list_articles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleRow>>>, ApiError> {
    let data = companydb_db::list_articles(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/articles — the publisher must exist and the url must be new.
pub(super) async fn create_article(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewArticle>,
) -> Result<(StatusCode, Json<ApiResponse<ArticleRow>>), ApiError> {
    let data = companydb_db::create_article(&state.pool, &body)
        .await
        .map_err(|e| map_write_error(&req_id.0, "article", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_article(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ArticleRow>>, ApiError> {
    let data = companydb_db::get_article(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "article", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/articles/{id} — a url owned by another article is a 409.
pub(super) async fn update_article(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<ArticleUpdate>,
) -> Result<Json<ApiResponse<ArticleRow>>, ApiError> {
    let data = companydb_db::update_article(&state.pool, id, &body)
        .await
        .map_err(|e| map_write_error(&req_id.0, "article", &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "article", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_article(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let found = companydb_db::delete_article(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    deleted(req_id, "article", id, found)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::send;

    #[sqlx::test(migrations = "../../migrations")]
    async fn article_for_unknown_publisher_is_rejected(pool: sqlx::PgPool) {
        let (status, json) = send(
            &pool,
            "POST",
            "/api/v1/articles",
            Some(json!({ "publisher_id": 404, "url": "https://daily.test/1" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    async fn post(pool: &sqlx::PgPool, uri: &str, body: serde_json::Value) -> i64 {
        let (status, json) = send(pool, "POST", uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].as_i64().expect("id")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_updates_supplied_fields_only(pool: sqlx::PgPool) {
        let daily = post(&pool, "/api/v1/publishers", json!({ "name": "Daily" })).await;
        let weekly = post(&pool, "/api/v1/publishers", json!({ "name": "Weekly" })).await;
        let id = post(
            &pool,
            "/api/v1/articles",
            json!({ "publisher_id": daily, "url": "https://daily.test/1", "remarks": "draft" }),
        )
        .await;

        let (status, json) = send(
            &pool,
            "PUT",
            &format!("/api/v1/articles/{id}"),
            Some(json!({ "publisher_id": weekly, "article_format": "html" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["data"]["publisher_id"], weekly);
        assert_eq!(json["data"]["article_format"], "html");
        assert_eq!(json["data"]["url"], "https://daily.test/1");
        assert_eq!(json["data"]["remarks"], "draft");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_with_taken_url_conflicts(pool: sqlx::PgPool) {
        let publisher = post(&pool, "/api/v1/publishers", json!({ "name": "Daily" })).await;
        post(
            &pool,
            "/api/v1/articles",
            json!({ "publisher_id": publisher, "url": "https://daily.test/1" }),
        )
        .await;
        let second = post(
            &pool,
            "/api/v1/articles",
            json!({ "publisher_id": publisher, "url": "https://daily.test/2" }),
        )
        .await;

        let (status, json) = send(
            &pool,
            "PUT",
            &format!("/api/v1/articles/{second}"),
            Some(json!({ "url": "https://daily.test/1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "conflict");

        let (status, json) = send(
            &pool,
            "PUT",
            &format!("/api/v1/articles/{second}"),
            Some(json!({ "url": "https://daily.test/2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "own url is not a conflict: {json}");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_with_unknown_publisher_is_rejected(pool: sqlx::PgPool) {
        let publisher = post(&pool, "/api/v1/publishers", json!({ "name": "Daily" })).await;
        let id = post(
            &pool,
            "/api/v1/articles",
            json!({ "publisher_id": publisher, "url": "https://daily.test/1" }),
        )
        .await;

        let (status, json) = send(
            &pool,
            "PUT",
            &format!("/api/v1/articles/{id}"),
            Some(json!({ "publisher_id": 9_999 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_unknown_article_is_not_found(pool: sqlx::PgPool) {
        let (status, _) = send(
            &pool,
            "PUT",
            "/api/v1/articles/404",
            Some(json!({ "remarks": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
