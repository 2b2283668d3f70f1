//! Brand handlers.
//!
//! - `GET    /api/v1/brands`       newest brands
//! - `POST   /api/v1/brands`       create with a normalized website
//! - `GET    /api/v1/brands/{id}`  one brand
//! - `PATCH  /api/v1/brands/{id}`  update, reconciling on a website change
//! - `DELETE /api/v1/brands/{id}`  delete with its dependents

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use companydb_core::{BrandDraft, BrandPatch, FixedEntityType, Website};
use companydb_db::{BrandRow, BrandUpdate, BrandUpdateOutcome, ReconcileError};
use serde::Deserialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{
    deleted, map_db_error, map_write_error, normalize_limit, ApiError, ApiResponse, AppState,
    Deleted, ListQuery, ResponseMeta,
};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateBrandRequest {
    pub name: String,
    pub website: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub entity_type: Option<String>,
    pub fixed_entity_type: Option<FixedEntityType>,
    pub apollo_enrichment: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateBrandRequest {
    pub website: Option<String>,
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl From<UpdateBrandRequest> for BrandUpdate {
    fn from(body: UpdateBrandRequest) -> Self {
        Self {
            website: body.website,
            patch: BrandPatch {
                name: body.name,
                contact_name: body.contact_name,
                contact_email: body.contact_email,
                contact_phone: body.contact_phone,
            },
        }
    }
}

fn invalid_website(req_id: &str, raw: &str) -> ApiError {
    ApiError::new(
        req_id,
        "validation_error",
        format!("website format is invalid: {raw}"),
    )
}

fn map_reconcile_error(req_id: &str, error: ReconcileError) -> ApiError {
    match error {
        ReconcileError::InvalidIdentityFormat(raw) => invalid_website(req_id, &raw),
        ReconcileError::BrandNotFound(id) => ApiError::not_found(req_id, "brand", id),
        ReconcileError::TransactionConflict(reason) => {
            tracing::warn!(%reason, "brand update lost a concurrent race");
            ApiError::new(
                req_id,
                "conflict",
                "brand was changed concurrently; retry the update",
            )
        }
        ReconcileError::StorageFailure(reason) => {
            tracing::error!(%reason, "brand update failed");
            ApiError::new(req_id, "internal_error", "brand update failed")
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<BrandRow>>>, ApiError> {
    let data = companydb_db::list_brands(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateBrandRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BrandRow>>), ApiError> {
    let rid = &req_id.0;
    let website = Website::parse(&body.website).map_err(|_| invalid_website(rid, &body.website))?;

    let draft = BrandDraft {
        website,
        name: body.name,
        contact_name: body.contact_name,
        contact_email: body.contact_email,
        contact_phone: body.contact_phone,
        entity_type: body.entity_type,
        fixed_entity_type: body.fixed_entity_type,
        apollo_enrichment: body.apollo_enrichment,
    };
    let data = companydb_db::create_brand(&state.pool, &draft)
        .await
        .map_err(|e| map_write_error(rid, "brand with that website", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<BrandRow>>, ApiError> {
    let data = companydb_db::get_brand(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "brand", id))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/brands/{id} — scalar update, rename or merge.
pub(super) async fn update_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBrandRequest>,
) -> Result<Json<ApiResponse<BrandUpdateOutcome>>, ApiError> {
    let data = companydb_db::update_brand(&state.pool, id, &body.into())
        .await
        .map_err(|e| map_reconcile_error(&req_id.0, e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let found = companydb_db::delete_brand(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    deleted(req_id, "brand", id, found)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::{json, Value};

    use super::*;
    use crate::api::test_support::send;

    async fn post_brand(pool: &sqlx::PgPool, website: &str) -> i64 {
        let (status, json) = send(
            pool,
            "POST",
            "/api/v1/brands",
            Some(json!({ "name": format!("{website} brand"), "website": website })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].as_i64().expect("brand id")
    }

    async fn post_sentiment(pool: &sqlx::PgPool, brand_id: i64) {
        let (_, publisher) =
            send(pool, "POST", "/api/v1/publishers", Some(json!({ "name": format!("P{brand_id}") })))
                .await;
        let publisher_id = publisher["data"]["id"].as_i64().expect("publisher id");
        let (_, article) = send(
            pool,
            "POST",
            "/api/v1/articles",
            Some(json!({
                "publisher_id": publisher_id,
                "url": format!("https://news.test/{brand_id}")
            })),
        )
        .await;
        let article_id = article["data"]["id"].as_i64().expect("article id");
        let (status, _) = send(
            pool,
            "POST",
            "/api/v1/sentiments",
            Some(json!({
                "publisher_id": publisher_id,
                "article_id": article_id,
                "brand_id": brand_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[test]
    fn reconcile_errors_map_to_api_codes() {
        let cases = [
            (
                ReconcileError::InvalidIdentityFormat("http://a.com".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ReconcileError::BrandNotFound(3), StatusCode::NOT_FOUND),
            (
                ReconcileError::TransactionConflict("deadlock".into()),
                StatusCode::CONFLICT,
            ),
            (
                ReconcileError::StorageFailure("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            let response = map_reconcile_error("req-1", error).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn invalid_website_message_echoes_input() {
        let error = invalid_website("req-1", "http://a.com");
        assert_eq!(error.error.code, "validation_error");
        assert!(error.error.message.contains("http://a.com"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_rejects_scheme_prefixed_website(pool: sqlx::PgPool) {
        let (status, json) = send(
            &pool,
            "POST",
            "/api/v1/brands",
            Some(json!({ "name": "Acme", "website": "https://acme.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("https://acme.com"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_normalizes_and_conflicts_on_duplicate(pool: sqlx::PgPool) {
        let id = post_brand(&pool, "Acme.COM/").await;
        let (_, json) = send(&pool, "GET", &format!("/api/v1/brands/{id}"), None).await;
        assert_eq!(json["data"]["website"], "acme.com");

        let (status, json) = send(
            &pool,
            "POST",
            "/api/v1/brands",
            Some(json!({ "name": "Other", "website": "acme.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "conflict");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn trailing_slashes_do_not_mint_a_second_identity(pool: sqlx::PgPool) {
        let id = post_brand(&pool, "a.com").await;

        let (status, json) = send(
            &pool,
            "POST",
            "/api/v1/brands",
            Some(json!({ "name": "Dup", "website": "a.com//" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT, "{json}");

        let (status, json) = send(
            &pool,
            "PATCH",
            &format!("/api/v1/brands/{id}"),
            Some(json!({ "website": "a.com//" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"], "updated");
        assert_eq!(json["data"]["brand"]["id"], id);
        assert_eq!(json["data"]["brand"]["website"], "a.com");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn patch_without_website_updates_in_place(pool: sqlx::PgPool) {
        let id = post_brand(&pool, "a.com").await;

        let (status, json) = send(
            &pool,
            "PATCH",
            &format!("/api/v1/brands/{id}"),
            Some(json!({ "name": "Alpha" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"], "updated");
        assert_eq!(json["data"]["brand"]["id"], id);
        assert_eq!(json["data"]["brand"]["name"], "Alpha");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn patch_to_free_website_renames(pool: sqlx::PgPool) {
        let id = post_brand(&pool, "a.com").await;
        post_sentiment(&pool, id).await;

        let (status, json) = send(
            &pool,
            "PATCH",
            &format!("/api/v1/brands/{id}"),
            Some(json!({ "website": "b.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["outcome"], "renamed");
        assert_eq!(data["deleted_brand"]["id"], id);
        assert_eq!(data["newly_created_brand"]["website"], "b.com");
        assert_eq!(data["updated_sentiments"].as_array().map(Vec::len), Some(1));
        assert_eq!(data["enrichment"]["action"], "untouched");

        let (status, _) = send(&pool, "GET", &format!("/api/v1/brands/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn patch_to_taken_website_merges(pool: sqlx::PgPool) {
        let source = post_brand(&pool, "a.com").await;
        let survivor = post_brand(&pool, "b.com").await;
        post_sentiment(&pool, source).await;

        let (status, json) = send(
            &pool,
            "PATCH",
            &format!("/api/v1/brands/{source}"),
            Some(json!({ "website": "b.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["outcome"], "merged");
        assert_eq!(data["surviving_brand"]["id"], survivor);
        assert_eq!(data["deleted_brand"]["id"], source);
        let moved: &Value = &data["updated_sentiments"][0];
        assert_eq!(moved["brand_id"], survivor);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn patch_with_malformed_website_is_rejected(pool: sqlx::PgPool) {
        let id = post_brand(&pool, "a.com").await;

        let (status, json) = send(
            &pool,
            "PATCH",
            &format!("/api/v1/brands/{id}"),
            Some(json!({ "website": "http://a.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("http://a.com"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn patch_unknown_brand_is_not_found(pool: sqlx::PgPool) {
        let (status, json) = send(
            &pool,
            "PATCH",
            "/api/v1/brands/404",
            Some(json!({ "website": "b.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }
}
