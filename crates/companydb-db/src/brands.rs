//! Database operations for the `brands` table.
//!
//! Query functions that reconciliation also runs inside its transaction are
//! generic over [`PgExecutor`], so they accept either `&PgPool` or
//! `&mut *tx`.

use chrono::{DateTime, Utc};
use companydb_core::{BrandDraft, BrandPatch, FixedEntityType, Website};
use serde::Serialize;
use serde_json::Value;
use sqlx::{PgExecutor, PgPool};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `brands` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct BrandRow {
    pub id: i64,
    pub name: String,
    pub website: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub entity_type: Option<String>,
    pub fixed_entity_type: Option<String>,
    pub apollo_enrichment: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BrandRow {
    /// Copy this row's descriptive fields into a draft for `website`.
    ///
    /// An unrecognised `fixed_entity_type` is dropped.
    #[must_use]
    pub fn to_draft(&self, website: Website) -> BrandDraft {
        BrandDraft {
            website,
            name: self.name.clone(),
            contact_name: self.contact_name.clone(),
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
            entity_type: self.entity_type.clone(),
            fixed_entity_type: self
                .fixed_entity_type
                .as_deref()
                .and_then(|value| value.parse::<FixedEntityType>().ok()),
            apollo_enrichment: self.apollo_enrichment.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns up to `limit` brands, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool, limit: i64) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, website, contact_name, contact_email, contact_phone, \
                entity_type, fixed_entity_type, apollo_enrichment, created_at, updated_at \
         FROM brands \
         ORDER BY id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single brand by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand<'e, E>(executor: E, id: i64) -> Result<Option<BrandRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, website, contact_name, contact_email, contact_phone, \
                entity_type, fixed_entity_type, apollo_enrichment, created_at, updated_at \
         FROM brands \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Returns the brand that owns `website`, or `None` if it is unclaimed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand_by_website<'e, E>(
    executor: E,
    website: &str,
) -> Result<Option<BrandRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, website, contact_name, contact_email, contact_phone, \
                entity_type, fixed_entity_type, apollo_enrichment, created_at, updated_at \
         FROM brands \
         WHERE website = $1",
    )
    .bind(website)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Inserts a brand from a validated draft and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a unique
/// violation when another brand already owns the website.
pub async fn create_brand<'e, E>(executor: E, draft: &BrandDraft) -> Result<BrandRow, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, BrandRow>(
        "INSERT INTO brands (name, website, contact_name, contact_email, contact_phone, \
                             entity_type, fixed_entity_type, apollo_enrichment) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id, name, website, contact_name, contact_email, contact_phone, \
                   entity_type, fixed_entity_type, apollo_enrichment, created_at, updated_at",
    )
    .bind(&draft.name)
    .bind(draft.website.as_str())
    .bind(&draft.contact_name)
    .bind(&draft.contact_email)
    .bind(&draft.contact_phone)
    .bind(&draft.entity_type)
    .bind(draft.fixed_entity_type.map(FixedEntityType::as_str))
    .bind(&draft.apollo_enrichment)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Applies the scalar fields of `patch` to a brand. The website is never
/// touched here.
///
/// Returns `None` if the brand does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_brand_fields<'e, E>(
    executor: E,
    id: i64,
    patch: &BrandPatch,
) -> Result<Option<BrandRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, BrandRow>(
        "UPDATE brands \
         SET name = COALESCE($2, name), \
             contact_name = COALESCE($3, contact_name), \
             contact_email = COALESCE($4, contact_email), \
             contact_phone = COALESCE($5, contact_phone), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, name, website, contact_name, contact_email, contact_phone, \
                   entity_type, fixed_entity_type, apollo_enrichment, created_at, updated_at",
    )
    .bind(id)
    .bind(&patch.name)
    .bind(&patch.contact_name)
    .bind(&patch.contact_email)
    .bind(&patch.contact_phone)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Deletes a brand. Its sentiments and enrichment go with it through the
/// `ON DELETE CASCADE` foreign keys.
///
/// Returns `false` if no brand had this id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_brand(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
