//! Database operations for the `batch_statuses` table.
//!
//! Batch statuses are keyed by the external batch id rather than a surrogate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

macro_rules! batch_status_columns {
    () => {
        "batch_id, publisher_id, object_type, endpoint, errors, input_file_id, \
         completion_window, status, output_file_id, error_file_id, in_progress_at, expires_at, \
         completed_at, failed_at, expired_at, request_total, request_completed, request_failed, \
         set_metadata, batch_type, are_results_uploaded, created_at, updated_at"
    };
}

/// A row from the `batch_statuses` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct BatchStatusRow {
    pub batch_id: String,
    pub publisher_id: i64,
    pub object_type: Option<String>,
    pub endpoint: Option<String>,
    pub errors: Option<String>,
    pub input_file_id: Option<String>,
    pub completion_window: Option<String>,
    pub status: Option<String>,
    pub output_file_id: Option<String>,
    pub error_file_id: Option<String>,
    pub in_progress_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub request_total: Option<i32>,
    pub request_completed: Option<i32>,
    pub request_failed: Option<i32>,
    pub set_metadata: Option<Value>,
    pub batch_type: Option<String>,
    pub are_results_uploaded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBatchStatus {
    pub batch_id: String,
    pub publisher_id: i64,
    pub object_type: Option<String>,
    pub endpoint: Option<String>,
    pub errors: Option<String>,
    pub input_file_id: Option<String>,
    pub completion_window: Option<String>,
    pub status: Option<String>,
    pub output_file_id: Option<String>,
    pub error_file_id: Option<String>,
    pub in_progress_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub request_total: Option<i32>,
    pub request_completed: Option<i32>,
    pub request_failed: Option<i32>,
    pub set_metadata: Option<Value>,
    pub batch_type: Option<String>,
    #[serde(default)]
    pub are_results_uploaded: bool,
}

/// Progress fields a batch poller reports; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchStatusUpdate {
    pub status: Option<String>,
    pub errors: Option<String>,
    pub output_file_id: Option<String>,
    pub error_file_id: Option<String>,
    pub in_progress_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub request_total: Option<i32>,
    pub request_completed: Option<i32>,
    pub request_failed: Option<i32>,
    pub are_results_uploaded: Option<bool>,
}

/// Returns up to `limit` batch statuses, most recently created first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_batch_statuses(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<BatchStatusRow>, DbError> {
    let rows = sqlx::query_as::<_, BatchStatusRow>(concat!(
        "SELECT ",
        batch_status_columns!(),
        " FROM batch_statuses ORDER BY created_at DESC, batch_id LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_batch_status(
    pool: &PgPool,
    batch_id: &str,
) -> Result<Option<BatchStatusRow>, DbError> {
    let row = sqlx::query_as::<_, BatchStatusRow>(concat!(
        "SELECT ",
        batch_status_columns!(),
        " FROM batch_statuses WHERE batch_id = $1"
    ))
    .bind(batch_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Records a newly submitted batch.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails: a unique violation for a
/// known batch id, a foreign-key violation for an unknown publisher.
pub async fn create_batch_status(
    pool: &PgPool,
    batch: &NewBatchStatus,
) -> Result<BatchStatusRow, DbError> {
    let row = sqlx::query_as::<_, BatchStatusRow>(concat!(
        "INSERT INTO batch_statuses (batch_id, publisher_id, object_type, endpoint, errors, \
             input_file_id, completion_window, status, output_file_id, error_file_id, \
             in_progress_at, expires_at, completed_at, failed_at, expired_at, request_total, \
             request_completed, request_failed, set_metadata, batch_type, are_results_uploaded) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21) \
         RETURNING ",
        batch_status_columns!()
    ))
    .bind(&batch.batch_id)
    .bind(batch.publisher_id)
    .bind(&batch.object_type)
    .bind(&batch.endpoint)
    .bind(&batch.errors)
    .bind(&batch.input_file_id)
    .bind(&batch.completion_window)
    .bind(&batch.status)
    .bind(&batch.output_file_id)
    .bind(&batch.error_file_id)
    .bind(batch.in_progress_at)
    .bind(batch.expires_at)
    .bind(batch.completed_at)
    .bind(batch.failed_at)
    .bind(batch.expired_at)
    .bind(batch.request_total)
    .bind(batch.request_completed)
    .bind(batch.request_failed)
    .bind(&batch.set_metadata)
    .bind(&batch.batch_type)
    .bind(batch.are_results_uploaded)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies a progress report, returning `None` for an unknown batch id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_batch_status(
    pool: &PgPool,
    batch_id: &str,
    update: &BatchStatusUpdate,
) -> Result<Option<BatchStatusRow>, DbError> {
    let row = sqlx::query_as::<_, BatchStatusRow>(concat!(
        "UPDATE batch_statuses \
         SET status = COALESCE($2, status), \
             errors = COALESCE($3, errors), \
             output_file_id = COALESCE($4, output_file_id), \
             error_file_id = COALESCE($5, error_file_id), \
             in_progress_at = COALESCE($6, in_progress_at), \
             completed_at = COALESCE($7, completed_at), \
             failed_at = COALESCE($8, failed_at), \
             expired_at = COALESCE($9, expired_at), \
             request_total = COALESCE($10, request_total), \
             request_completed = COALESCE($11, request_completed), \
             request_failed = COALESCE($12, request_failed), \
             are_results_uploaded = COALESCE($13, are_results_uploaded), \
             updated_at = NOW() \
         WHERE batch_id = $1 \
         RETURNING ",
        batch_status_columns!()
    ))
    .bind(batch_id)
    .bind(&update.status)
    .bind(&update.errors)
    .bind(&update.output_file_id)
    .bind(&update.error_file_id)
    .bind(update.in_progress_at)
    .bind(update.completed_at)
    .bind(update.failed_at)
    .bind(update.expired_at)
    .bind(update.request_total)
    .bind(update.request_completed)
    .bind(update.request_failed)
    .bind(update.are_results_uploaded)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
