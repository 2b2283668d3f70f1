use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use companydb_db::{EnrichmentRow, EnrichmentUpdate, NewEnrichment};

use crate::middleware::RequestId;

use super::{
    deleted, map_db_error, map_write_error, normalize_limit, ApiError, ApiResponse, AppState,
    Deleted, ListQuery, ResponseMeta,
};

pub(super) async fn list_enrichments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<EnrichmentRow>>>, ApiError> {
    let data = companydb_db::list_enrichments(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/enrichments — 409 if the brand already has one.
pub(super) async fn create_enrichment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewEnrichment>,
) -> Result<(StatusCode, Json<ApiResponse<EnrichmentRow>>), ApiError> {
    let data = companydb_db::create_enrichment(&state.pool, &body)
        .await
        .map_err(|e| map_write_error(&req_id.0, "enrichment for that brand", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_enrichment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<EnrichmentRow>>, ApiError> {
    let data = companydb_db::get_enrichment(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "enrichment", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_brand_enrichment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(brand_id): Path<i64>,
) -> Result<Json<ApiResponse<EnrichmentRow>>, ApiError> {
    let data = companydb_db::get_enrichment_for_brand(&state.pool, brand_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "enrichment for brand", brand_id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/enrichments/{id} — metrics only; the owning brand is fixed.
pub(super) async fn update_enrichment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<EnrichmentUpdate>,
) -> Result<Json<ApiResponse<EnrichmentRow>>, ApiError> {
    let data = companydb_db::update_enrichment(&state.pool, id, &body)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "enrichment", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_enrichment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let found = companydb_db::delete_enrichment(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    deleted(req_id, "enrichment", id, found)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::send;

    async fn brand(pool: &sqlx::PgPool, website: &str) -> i64 {
        let (_, json) = send(
            pool,
            "POST",
            "/api/v1/brands",
            Some(json!({ "name": website, "website": website })),
        )
        .await;
        json["data"]["id"].as_i64().expect("brand id")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn second_enrichment_for_a_brand_conflicts(pool: sqlx::PgPool) {
        let brand_id = brand(&pool, "acme.com").await;
        let body = json!({
            "brand_id": brand_id,
            "rank": 1200,
            "bounce_rate": "0.42",
            "traffic_metrics": { "organic_search": "0.31" }
        });

        let (status, first) = send(&pool, "POST", "/api/v1/enrichments", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED, "{first}");
        assert_eq!(first["data"]["rank"], 1200);
        assert_eq!(first["data"]["traffic_metrics"]["organic_search"], "0.31");

        let (status, second) = send(&pool, "POST", "/api/v1/enrichments", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(second["error"]["code"], "conflict");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn enrichment_for_unknown_brand_is_a_validation_error(pool: sqlx::PgPool) {
        let (status, json) = send(
            &pool,
            "POST",
            "/api/v1/enrichments",
            Some(json!({ "brand_id": 777 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn brand_enrichment_lookup(pool: sqlx::PgPool) {
        let with = brand(&pool, "a.com").await;
        let without = brand(&pool, "b.com").await;
        let (_, created) = send(
            &pool,
            "POST",
            "/api/v1/enrichments",
            Some(json!({ "brand_id": with, "industry": "Retail" })),
        )
        .await;

        let (status, json) =
            send(&pool, "GET", &format!("/api/v1/brands/{with}/enrichment"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["id"], created["data"]["id"]);
        assert_eq!(json["data"]["industry"], "Retail");

        let (status, _) =
            send(&pool, "GET", &format!("/api/v1/brands/{without}/enrichment"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_updates_metrics_and_merges_traffic(pool: sqlx::PgPool) {
        let brand_id = brand(&pool, "acme.com").await;
        let (_, created) = send(
            &pool,
            "POST",
            "/api/v1/enrichments",
            Some(json!({
                "brand_id": brand_id,
                "industry": "Retail",
                "rank": 900,
                "traffic_metrics": { "organic_search": "0.31" }
            })),
        )
        .await;
        let id = created["data"]["id"].as_i64().expect("enrichment id");

        let (status, json) = send(
            &pool,
            "PUT",
            &format!("/api/v1/enrichments/{id}"),
            Some(json!({ "rank": 850, "traffic_metrics": { "paid_search": "0.05" } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["data"]["rank"], 850);
        assert_eq!(json["data"]["industry"], "Retail");
        assert_eq!(json["data"]["brand_id"], brand_id);
        assert_eq!(json["data"]["traffic_metrics"]["organic_search"], "0.31");
        assert_eq!(json["data"]["traffic_metrics"]["paid_search"], "0.05");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_cannot_move_an_enrichment_to_another_brand(pool: sqlx::PgPool) {
        let owner = brand(&pool, "a.com").await;
        let other = brand(&pool, "b.com").await;
        let (_, created) = send(
            &pool,
            "POST",
            "/api/v1/enrichments",
            Some(json!({ "brand_id": owner })),
        )
        .await;
        let id = created["data"]["id"].as_i64().expect("enrichment id");

        let (status, _) = send(
            &pool,
            "PUT",
            &format!("/api/v1/enrichments/{id}"),
            Some(json!({ "brand_id": other })),
        )
        .await;
        assert!(status.is_client_error(), "{status}");

        let (_, json) = send(&pool, "GET", &format!("/api/v1/enrichments/{id}"), None).await;
        assert_eq!(json["data"]["brand_id"], owner);
        let (status, _) =
            send(&pool, "GET", &format!("/api/v1/brands/{other}/enrichment"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_unknown_enrichment_is_not_found(pool: sqlx::PgPool) {
        let (status, json) = send(
            &pool,
            "PUT",
            "/api/v1/enrichments/404",
            Some(json!({ "rank": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }
}
