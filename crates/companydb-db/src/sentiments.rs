//! Database operations for the `sentiments` table.
//!
//! `brand_id` is not editable here: ownership of a sentiment only changes
//! through brand reconciliation.

use chrono::{DateTime, Utc};
use companydb_core::{Licensability, LinkSource, SentimentLabel};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row and input types
// ---------------------------------------------------------------------------

/// A row from the `sentiments` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct SentimentRow {
    pub id: i64,
    pub publisher_id: i64,
    pub article_id: i64,
    pub brand_id: i64,
    pub batch_id: Option<String>,
    pub sentiment_version: Option<String>,
    pub link_source: Option<String>,
    pub sentiment: Option<String>,
    pub summary: Option<String>,
    pub licensability: Option<String>,
    pub is_manually_verified: bool,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSentiment {
    pub publisher_id: i64,
    pub article_id: i64,
    pub brand_id: i64,
    pub batch_id: Option<String>,
    pub sentiment_version: Option<String>,
    pub link_source: Option<LinkSource>,
    pub sentiment: Option<SentimentLabel>,
    pub summary: Option<String>,
    pub licensability: Option<Licensability>,
    #[serde(default)]
    pub is_manually_verified: bool,
    pub remarks: Option<String>,
}

/// Judgment fields replaced by `PUT /sentiments/{id}`; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentimentUpdate {
    pub batch_id: Option<String>,
    pub sentiment_version: Option<String>,
    pub link_source: Option<LinkSource>,
    pub sentiment: Option<SentimentLabel>,
    pub summary: Option<String>,
    pub licensability: Option<Licensability>,
    pub is_manually_verified: Option<bool>,
    pub remarks: Option<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns up to `limit` sentiments, newest first, optionally for one brand.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sentiments(
    pool: &PgPool,
    brand_id: Option<i64>,
    limit: i64,
) -> Result<Vec<SentimentRow>, DbError> {
    let rows = sqlx::query_as::<_, SentimentRow>(
        "SELECT id, publisher_id, article_id, brand_id, batch_id, sentiment_version, \
                link_source, sentiment, summary, licensability, is_manually_verified, \
                remarks, created_at, updated_at \
         FROM sentiments \
         WHERE ($1::BIGINT IS NULL OR brand_id = $1) \
         ORDER BY id DESC \
         LIMIT $2",
    )
    .bind(brand_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_sentiment(pool: &PgPool, id: i64) -> Result<Option<SentimentRow>, DbError> {
    let row = sqlx::query_as::<_, SentimentRow>(
        "SELECT id, publisher_id, article_id, brand_id, batch_id, sentiment_version, \
                link_source, sentiment, summary, licensability, is_manually_verified, \
                remarks, created_at, updated_at \
         FROM sentiments \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a sentiment judgment.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; an unknown publisher,
/// article, brand or batch is a foreign-key violation.
pub async fn create_sentiment(
    pool: &PgPool,
    sentiment: &NewSentiment,
) -> Result<SentimentRow, DbError> {
    let row = sqlx::query_as::<_, SentimentRow>(
        "INSERT INTO sentiments (publisher_id, article_id, brand_id, batch_id, sentiment_version, \
                                 link_source, sentiment, summary, licensability, \
                                 is_manually_verified, remarks) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id, publisher_id, article_id, brand_id, batch_id, sentiment_version, \
                   link_source, sentiment, summary, licensability, is_manually_verified, \
                   remarks, created_at, updated_at",
    )
    .bind(sentiment.publisher_id)
    .bind(sentiment.article_id)
    .bind(sentiment.brand_id)
    .bind(&sentiment.batch_id)
    .bind(&sentiment.sentiment_version)
    .bind(sentiment.link_source.map(LinkSource::as_str))
    .bind(sentiment.sentiment.map(SentimentLabel::as_str))
    .bind(&sentiment.summary)
    .bind(sentiment.licensability.map(Licensability::as_str))
    .bind(sentiment.is_manually_verified)
    .bind(&sentiment.remarks)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies `update` to a sentiment, returning `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_sentiment(
    pool: &PgPool,
    id: i64,
    update: &SentimentUpdate,
) -> Result<Option<SentimentRow>, DbError> {
    let row = sqlx::query_as::<_, SentimentRow>(
        "UPDATE sentiments \
         SET batch_id = COALESCE($2, batch_id), \
             sentiment_version = COALESCE($3, sentiment_version), \
             link_source = COALESCE($4, link_source), \
             sentiment = COALESCE($5, sentiment), \
             summary = COALESCE($6, summary), \
             licensability = COALESCE($7, licensability), \
             is_manually_verified = COALESCE($8, is_manually_verified), \
             remarks = COALESCE($9, remarks), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, publisher_id, article_id, brand_id, batch_id, sentiment_version, \
                   link_source, sentiment, summary, licensability, is_manually_verified, \
                   remarks, created_at, updated_at",
    )
    .bind(id)
    .bind(&update.batch_id)
    .bind(&update.sentiment_version)
    .bind(update.link_source.map(LinkSource::as_str))
    .bind(update.sentiment.map(SentimentLabel::as_str))
    .bind(&update.summary)
    .bind(update.licensability.map(Licensability::as_str))
    .bind(update.is_manually_verified)
    .bind(&update.remarks)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_sentiment(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM sentiments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
