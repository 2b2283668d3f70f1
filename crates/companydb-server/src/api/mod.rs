mod articles;
mod batch_statuses;
mod brands;
mod enrichments;
mod publishers;
mod sentiments;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: bool,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn not_found(request_id: &str, what: &str, id: impl std::fmt::Display) -> Self {
        Self::new(request_id, "not_found", format!("{what} {id} not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &companydb_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Map an insert/update failure, turning constraint violations into client errors.
pub(super) fn map_write_error(
    request_id: &str,
    entity: &str,
    error: &companydb_db::DbError,
) -> ApiError {
    if error.is_unique_violation() {
        return ApiError::new(request_id, "conflict", format!("{entity} already exists"));
    }
    if error.is_foreign_key_violation() {
        return ApiError::new(
            request_id,
            "validation_error",
            format!("{entity} references a record that does not exist"),
        );
    }
    map_db_error(request_id.to_owned(), error)
}

/// Response for a `DELETE`; 404 when nothing matched.
fn deleted(
    req_id: RequestId,
    what: &str,
    id: impl std::fmt::Display,
    found: bool,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    if !found {
        return Err(ApiError::not_found(&req_id.0, what, id));
    }
    Ok(Json(ApiResponse {
        data: Deleted { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn catalog_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/publishers",
            get(publishers::list_publishers).post(publishers::create_publisher),
        )
        .route(
            "/api/v1/publishers/{id}",
            get(publishers::get_publisher)
                .put(publishers::update_publisher)
                .delete(publishers::delete_publisher),
        )
        .route(
            "/api/v1/brands",
            get(brands::list_brands).post(brands::create_brand),
        )
        .route(
            "/api/v1/brands/{id}",
            get(brands::get_brand)
                .patch(brands::update_brand)
                .delete(brands::delete_brand),
        )
        .route(
            "/api/v1/brands/{id}/enrichment",
            get(enrichments::get_brand_enrichment),
        )
        .route(
            "/api/v1/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route(
            "/api/v1/articles/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route(
            "/api/v1/sentiments",
            get(sentiments::list_sentiments).post(sentiments::create_sentiment),
        )
        .route(
            "/api/v1/sentiments/{id}",
            get(sentiments::get_sentiment)
                .put(sentiments::update_sentiment)
                .delete(sentiments::delete_sentiment),
        )
        .route(
            "/api/v1/enrichments",
            get(enrichments::list_enrichments).post(enrichments::create_enrichment),
        )
        .route(
            "/api/v1/enrichments/{id}",
            get(enrichments::get_enrichment)
                .put(enrichments::update_enrichment)
                .delete(enrichments::delete_enrichment),
        )
        .route(
            "/api/v1/batch-statuses",
            get(batch_statuses::list_batch_statuses).post(batch_statuses::create_batch_status),
        )
        .route(
            "/api/v1/batch-statuses/{batch_id}",
            get(batch_statuses::get_batch_status).patch(batch_statuses::update_batch_status),
        )
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .merge(catalog_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match companydb_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{build_app, AppState};

    /// Send one request through a fresh router and decode the JSON body.
    pub(crate) async fn send(
        pool: &sqlx::PgPool,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let app = build_app(AppState { pool: pool.clone() });
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        // Extractor rejections answer in plain text.
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::send;
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let cases = [
            ("validation_error", StatusCode::BAD_REQUEST),
            ("not_found", StatusCode::NOT_FOUND),
            ("conflict", StatusCode::CONFLICT),
            ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            let response = ApiError::new("req-1", code, "message").into_response();
            assert_eq!(response.status(), status, "code {code}");
        }
    }

    #[test]
    fn write_error_without_constraint_is_internal() {
        let error = map_write_error("req-1", "brand", &companydb_db::DbError::NotFound);
        assert_eq!(error.error.code, "internal_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok_with_request_id(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool });
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-health")
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn delete_of_unknown_record_is_not_found(pool: sqlx::PgPool) {
        for uri in [
            "/api/v1/publishers/404",
            "/api/v1/brands/404",
            "/api/v1/articles/404",
            "/api/v1/sentiments/404",
            "/api/v1/enrichments/404",
        ] {
            let (status, body) = send(&pool, "DELETE", uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"]["code"], "not_found");
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn catalog_can_be_built_through_the_api(pool: sqlx::PgPool) {
        let (status, publisher) =
            send(&pool, "POST", "/api/v1/publishers", Some(json!({ "name": "Daily" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let publisher_id = publisher["data"]["id"].as_i64().expect("publisher id");

        let (status, article) = send(
            &pool,
            "POST",
            "/api/v1/articles",
            Some(json!({ "publisher_id": publisher_id, "url": "https://daily.test/1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let article_id = article["data"]["id"].as_i64().expect("article id");

        let (status, brand) = send(
            &pool,
            "POST",
            "/api/v1/brands",
            Some(json!({ "name": "Acme", "website": "acme.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let brand_id = brand["data"]["id"].as_i64().expect("brand id");

        let (status, sentiment) = send(
            &pool,
            "POST",
            "/api/v1/sentiments",
            Some(json!({
                "publisher_id": publisher_id,
                "article_id": article_id,
                "brand_id": brand_id,
                "sentiment": "positive",
                "link_source": "google_url_tool"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(sentiment["data"]["link_source"], "google_url_tool");

        let (status, listed) =
            send(&pool, "GET", &format!("/api/v1/sentiments?brand_id={brand_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
    }
}
