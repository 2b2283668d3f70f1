//! Brand identity reconciliation.
//!
//! A brand update that changes the website never edits the identity in
//! place. Detection, location, planning and execution all run in one
//! transaction that is committed once; any error drops the transaction and
//! Postgres rolls it back, so callers observe either the full result or the
//! pre-update state.

mod detect;
mod execute;
mod locate;

use companydb_core::{plan_merge, BrandPatch, CoreError, MergeTarget, Website};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::brands::{update_brand_fields, BrandRow};
use crate::sentiments::SentimentRow;
use crate::DbError;

use detect::IdentityChange;
pub use execute::EnrichmentOutcome;

/// SQLSTATEs for losing a race: unique violation, serialization failure, deadlock.
const CONFLICT_SQLSTATES: [&str; 3] = ["23505", "40001", "40P01"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("website format is invalid: {0}")]
    InvalidIdentityFormat(String),
    #[error("brand {0} not found")]
    BrandNotFound(i64),
    /// Another transaction won a race for the same rows or identity. Retryable.
    #[error("transaction conflict: {0}")]
    TransactionConflict(String),
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl From<sqlx::Error> for ReconcileError {
    fn from(err: sqlx::Error) -> Self {
        let conflict = match &err {
            sqlx::Error::Database(db_err) => db_err
                .code()
                .is_some_and(|code| CONFLICT_SQLSTATES.iter().any(|c| *c == code)),
            _ => false,
        };
        if conflict {
            Self::TransactionConflict(err.to_string())
        } else {
            Self::StorageFailure(err.to_string())
        }
    }
}

impl From<DbError> for ReconcileError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(e) => e.into(),
            other => Self::StorageFailure(other.to_string()),
        }
    }
}

impl From<CoreError> for ReconcileError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidIdentityFormat(raw) => Self::InvalidIdentityFormat(raw),
            other => Self::StorageFailure(other.to_string()),
        }
    }
}

/// A requested change to one brand.
#[derive(Debug, Clone, Default)]
pub struct BrandUpdate {
    /// Requested website; `None` leaves the identity alone.
    pub website: Option<String>,
    pub patch: BrandPatch,
}

/// Result of [`update_brand`], tagged by `outcome` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BrandUpdateOutcome {
    /// Only scalar fields changed.
    Updated { brand: BrandRow },
    /// The website was free: a new brand took over the dependents.
    Renamed {
        deleted_brand: BrandRow,
        newly_created_brand: BrandRow,
        updated_sentiments: Vec<SentimentRow>,
        enrichment: EnrichmentOutcome,
    },
    /// The website belonged to another brand, which absorbed the dependents.
    Merged {
        deleted_brand: BrandRow,
        surviving_brand: BrandRow,
        updated_sentiments: Vec<SentimentRow>,
        enrichment: EnrichmentOutcome,
    },
}

impl BrandUpdateOutcome {
    /// The brand that holds the identity once the update has committed.
    #[must_use]
    pub fn canonical_brand(&self) -> &BrandRow {
        match self {
            Self::Updated { brand } => brand,
            Self::Renamed {
                newly_created_brand,
                ..
            } => newly_created_brand,
            Self::Merged {
                surviving_brand, ..
            } => surviving_brand,
        }
    }
}

/// Update a brand, reconciling its dependents if the website changes.
///
/// - No website, or the current one: scalar fields are updated in place.
/// - An unclaimed website: a new brand is created from the source's fields
///   overlaid with `update.patch`, the source's sentiments and enrichment are
///   moved to it and the source is deleted.
/// - A website owned by another brand: that brand survives unchanged, takes
///   the sentiments, keeps its own enrichment if it has one (otherwise takes
///   the source's) and the source is deleted. `update.patch` is not applied.
///
/// # Errors
///
/// - [`ReconcileError::InvalidIdentityFormat`] before any storage access.
/// - [`ReconcileError::BrandNotFound`] if `brand_id` does not exist.
/// - [`ReconcileError::TransactionConflict`] if a concurrent writer won.
/// - [`ReconcileError::StorageFailure`] for any other database error.
pub async fn update_brand(
    pool: &PgPool,
    brand_id: i64,
    update: &BrandUpdate,
) -> Result<BrandUpdateOutcome, ReconcileError> {
    let candidate = update.website.as_deref().map(Website::parse).transpose()?;

    let mut tx = pool.begin().await?;

    let source = detect::lock_brand(&mut tx, brand_id)
        .await?
        .ok_or(ReconcileError::BrandNotFound(brand_id))?;

    let change = detect::classify(&mut tx, &source, candidate).await?;

    let outcome = match change {
        IdentityChange::Unchanged => {
            let brand = if update.patch.is_empty() {
                source
            } else {
                update_brand_fields(&mut *tx, brand_id, &update.patch)
                    .await?
                    .ok_or(ReconcileError::BrandNotFound(brand_id))?
            };
            BrandUpdateOutcome::Updated { brand }
        }
        IdentityChange::Free(website) => {
            let dependents = locate::dependents(&mut tx, brand_id).await?;
            let draft = update.patch.apply(source.to_draft(website));
            let plan = plan_merge(brand_id, dependents, MergeTarget::Fresh(draft))?;
            let applied = execute::apply(&mut tx, plan).await?;
            BrandUpdateOutcome::Renamed {
                deleted_brand: applied.deleted,
                newly_created_brand: applied.target,
                updated_sentiments: applied.moved_sentiments,
                enrichment: applied.enrichment,
            }
        }
        IdentityChange::Collision { survivor } => {
            let dependents = locate::dependents(&mut tx, brand_id).await?;
            let target = MergeTarget::Existing {
                brand_id: survivor.id,
                enrichment_id: locate::enrichment_of(&mut tx, survivor.id).await?,
            };
            let plan = plan_merge(brand_id, dependents, target)?;
            let applied = execute::apply(&mut tx, plan).await?;
            BrandUpdateOutcome::Merged {
                deleted_brand: applied.deleted,
                surviving_brand: applied.target,
                updated_sentiments: applied.moved_sentiments,
                enrichment: applied.enrichment,
            }
        }
    };

    tx.commit().await?;

    match &outcome {
        BrandUpdateOutcome::Updated { .. } => {
            tracing::debug!(brand_id, "brand fields updated");
        }
        BrandUpdateOutcome::Renamed {
            newly_created_brand,
            updated_sentiments,
            ..
        } => {
            tracing::info!(
                brand_id,
                new_brand_id = newly_created_brand.id,
                website = %newly_created_brand.website,
                sentiments = updated_sentiments.len(),
                "brand renamed"
            );
        }
        BrandUpdateOutcome::Merged {
            surviving_brand,
            updated_sentiments,
            enrichment,
            ..
        } => {
            tracing::info!(
                brand_id,
                surviving_brand_id = surviving_brand.id,
                website = %surviving_brand.website,
                sentiments = updated_sentiments.len(),
                enrichment = enrichment_action(enrichment),
                "brand merged into existing brand"
            );
        }
    }

    Ok(outcome)
}

fn enrichment_action(outcome: &EnrichmentOutcome) -> &'static str {
    match outcome {
        EnrichmentOutcome::Untouched => "untouched",
        EnrichmentOutcome::Reassigned { .. } => "reassigned",
        EnrichmentOutcome::Discarded { .. } => "discarded",
    }
}
