//! Database operations for the `publishers` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `publishers` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct PublisherRow {
    pub id: i64,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPublisher {
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// Fields replaced by `PUT /publishers/{id}`; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublisherUpdate {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// Returns up to `limit` publishers, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_publishers(pool: &PgPool, limit: i64) -> Result<Vec<PublisherRow>, DbError> {
    let rows = sqlx::query_as::<_, PublisherRow>(
        "SELECT id, name, contact_name, contact_email, contact_phone, created_at, updated_at \
         FROM publishers \
         ORDER BY id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_publisher(pool: &PgPool, id: i64) -> Result<Option<PublisherRow>, DbError> {
    let row = sqlx::query_as::<_, PublisherRow>(
        "SELECT id, name, contact_name, contact_email, contact_phone, created_at, updated_at \
         FROM publishers \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a publisher.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; a duplicate name is a
/// unique violation.
pub async fn create_publisher(
    pool: &PgPool,
    publisher: &NewPublisher,
) -> Result<PublisherRow, DbError> {
    let row = sqlx::query_as::<_, PublisherRow>(
        "INSERT INTO publishers (name, contact_name, contact_email, contact_phone) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, name, contact_name, contact_email, contact_phone, created_at, updated_at",
    )
    .bind(&publisher.name)
    .bind(&publisher.contact_name)
    .bind(&publisher.contact_email)
    .bind(&publisher.contact_phone)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies `update` to a publisher, returning `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_publisher(
    pool: &PgPool,
    id: i64,
    update: &PublisherUpdate,
) -> Result<Option<PublisherRow>, DbError> {
    let row = sqlx::query_as::<_, PublisherRow>(
        "UPDATE publishers \
         SET name = COALESCE($2, name), \
             contact_name = COALESCE($3, contact_name), \
             contact_email = COALESCE($4, contact_email), \
             contact_phone = COALESCE($5, contact_phone), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, name, contact_name, contact_email, contact_phone, created_at, updated_at",
    )
    .bind(id)
    .bind(&update.name)
    .bind(&update.contact_name)
    .bind(&update.contact_email)
    .bind(&update.contact_phone)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes a publisher along with its articles, sentiments and batch statuses.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_publisher(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
