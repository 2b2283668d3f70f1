//! Cascade execution: apply a merge plan inside the caller's transaction.
//!
//! Steps run in a fixed order: provision the target, move sentiments,
//! resolve the enrichment, then delete the source brand. Every step checks
//! what it touched against the plan; a mismatch means something changed
//! underneath the locks and the whole unit is abandoned.

use companydb_core::{EnrichmentAction, MergePlan, PlanTarget};
use serde::Serialize;
use sqlx::PgConnection;

use super::ReconcileError;
use crate::brands::{create_brand, get_brand, BrandRow};
use crate::enrichments::EnrichmentRow;
use crate::sentiments::SentimentRow;

/// What happened to the source brand's enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// The source brand had none.
    Untouched,
    /// Moved to the target brand.
    Reassigned { enrichment: EnrichmentRow },
    /// Deleted because the survivor already had one.
    Discarded { enrichment: EnrichmentRow },
}

/// Audit trail of an applied plan.
#[derive(Debug)]
pub(super) struct AppliedMerge {
    pub target: BrandRow,
    pub moved_sentiments: Vec<SentimentRow>,
    pub enrichment: EnrichmentOutcome,
    pub deleted: BrandRow,
}

pub(super) async fn apply(
    conn: &mut PgConnection,
    plan: MergePlan,
) -> Result<AppliedMerge, ReconcileError> {
    let source_id = plan.source_brand_id;

    let target = match &plan.target {
        PlanTarget::Create(draft) => create_brand(&mut *conn, draft).await?,
        PlanTarget::Survivor { brand_id } => get_brand(&mut *conn, *brand_id)
            .await?
            .ok_or(ReconcileError::BrandNotFound(*brand_id))?,
    };
    tracing::debug!(source_id, target_id = target.id, "merge target ready");

    let moved_sentiments = move_sentiments(conn, source_id, target.id).await?;
    let mut moved_ids: Vec<i64> = moved_sentiments.iter().map(|s| s.id).collect();
    moved_ids.sort_unstable();
    if moved_ids != plan.sentiment_ids {
        return Err(ReconcileError::TransactionConflict(format!(
            "brand {source_id}: located {} sentiments but moved {}",
            plan.sentiment_ids.len(),
            moved_ids.len()
        )));
    }

    let enrichment = match plan.enrichment {
        EnrichmentAction::Untouched => EnrichmentOutcome::Untouched,
        EnrichmentAction::Reassign { enrichment_id } => {
            let enrichment = reassign_enrichment(conn, enrichment_id, source_id, target.id)
                .await?
                .ok_or_else(|| vanished_enrichment(enrichment_id, source_id))?;
            EnrichmentOutcome::Reassigned { enrichment }
        }
        EnrichmentAction::Discard { enrichment_id } => {
            let enrichment = discard_enrichment(conn, enrichment_id, source_id)
                .await?
                .ok_or_else(|| vanished_enrichment(enrichment_id, source_id))?;
            EnrichmentOutcome::Discarded { enrichment }
        }
    };

    let remaining = count_dependents(conn, source_id).await?;
    if remaining != 0 {
        return Err(ReconcileError::TransactionConflict(format!(
            "brand {source_id} still owns {remaining} dependent records"
        )));
    }

    let deleted = delete_source(conn, source_id).await?.ok_or_else(|| {
        ReconcileError::TransactionConflict(format!("brand {source_id} was not deleted"))
    })?;

    Ok(AppliedMerge {
        target,
        moved_sentiments,
        enrichment,
        deleted,
    })
}

fn vanished_enrichment(enrichment_id: i64, source_id: i64) -> ReconcileError {
    ReconcileError::TransactionConflict(format!(
        "enrichment {enrichment_id} no longer belongs to brand {source_id}"
    ))
}

async fn move_sentiments(
    conn: &mut PgConnection,
    source_id: i64,
    target_id: i64,
) -> Result<Vec<SentimentRow>, sqlx::Error> {
    sqlx::query_as::<_, SentimentRow>(
        "UPDATE sentiments \
         SET brand_id = $2, updated_at = NOW() \
         WHERE brand_id = $1 \
         RETURNING id, publisher_id, article_id, brand_id, batch_id, sentiment_version, \
                   link_source, sentiment, summary, licensability, is_manually_verified, \
                   remarks, created_at, updated_at",
    )
    .bind(source_id)
    .bind(target_id)
    .fetch_all(&mut *conn)
    .await
}

async fn reassign_enrichment(
    conn: &mut PgConnection,
    enrichment_id: i64,
    source_id: i64,
    target_id: i64,
) -> Result<Option<EnrichmentRow>, sqlx::Error> {
    sqlx::query_as::<_, EnrichmentRow>(
        "UPDATE enrichments_simweb \
         SET brand_id = $3, updated_at = NOW() \
         WHERE id = $1 AND brand_id = $2 \
         RETURNING *",
    )
    .bind(enrichment_id)
    .bind(source_id)
    .bind(target_id)
    .fetch_optional(&mut *conn)
    .await
}

async fn discard_enrichment(
    conn: &mut PgConnection,
    enrichment_id: i64,
    source_id: i64,
) -> Result<Option<EnrichmentRow>, sqlx::Error> {
    sqlx::query_as::<_, EnrichmentRow>(
        "DELETE FROM enrichments_simweb WHERE id = $1 AND brand_id = $2 RETURNING *",
    )
    .bind(enrichment_id)
    .bind(source_id)
    .fetch_optional(&mut *conn)
    .await
}

async fn count_dependents(conn: &mut PgConnection, brand_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT (SELECT COUNT(*) FROM sentiments WHERE brand_id = $1) \
              + (SELECT COUNT(*) FROM enrichments_simweb WHERE brand_id = $1)",
    )
    .bind(brand_id)
    .fetch_one(&mut *conn)
    .await
}

async fn delete_source(
    conn: &mut PgConnection,
    brand_id: i64,
) -> Result<Option<BrandRow>, sqlx::Error> {
    sqlx::query_as::<_, BrandRow>(
        "DELETE FROM brands WHERE id = $1 \
         RETURNING id, name, website, contact_name, contact_email, contact_phone, \
                   entity_type, fixed_entity_type, apollo_enrichment, created_at, updated_at",
    )
    .bind(brand_id)
    .fetch_optional(&mut *conn)
    .await
}
