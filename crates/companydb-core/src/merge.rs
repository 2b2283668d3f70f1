//! Merge planning for brand identity changes.
//!
//! Renaming a brand never edits its `website` in place. Either a fresh brand
//! row is provisioned for the new identity, or the brand already owning that
//! identity survives. In both cases the source brand's dependents move to the
//! target and the source brand is deleted.

use serde::Serialize;

use crate::brands::BrandDraft;
use crate::CoreError;

/// Dependent records owned by one brand at planning time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependentSet {
    pub sentiment_ids: Vec<i64>,
    pub enrichment_id: Option<i64>,
}

/// Outcome of duplicate detection, as input to the planner.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeTarget {
    /// The identity is unclaimed; a new brand row is created from the draft.
    Fresh(BrandDraft),
    /// Another live brand owns the identity.
    Existing {
        brand_id: i64,
        enrichment_id: Option<i64>,
    },
}

/// The brand that holds the dependents once the plan is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanTarget {
    Create(BrandDraft),
    Survivor { brand_id: i64 },
}

/// What happens to the source brand's enrichment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EnrichmentAction {
    /// The source brand has no enrichment.
    Untouched,
    Reassign { enrichment_id: i64 },
    /// The survivor already has an enrichment; the source's is deleted.
    Discard { enrichment_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub source_brand_id: i64,
    pub target: PlanTarget,
    pub sentiment_ids: Vec<i64>,
    pub enrichment: EnrichmentAction,
}

/// Decide where every dependent of `source_brand_id` goes.
///
/// The survivor's enrichment always wins: enrichment values are never merged
/// field by field.
///
/// # Errors
///
/// Returns [`CoreError::SelfMerge`] if the target is the source brand itself.
pub fn plan_merge(
    source_brand_id: i64,
    dependents: DependentSet,
    target: MergeTarget,
) -> Result<MergePlan, CoreError> {
    let (target, enrichment) = match target {
        MergeTarget::Fresh(draft) => {
            let enrichment = dependents
                .enrichment_id
                .map_or(EnrichmentAction::Untouched, |enrichment_id| {
                    EnrichmentAction::Reassign { enrichment_id }
                });
            (PlanTarget::Create(draft), enrichment)
        }
        MergeTarget::Existing {
            brand_id,
            enrichment_id: survivor_enrichment,
        } => {
            if brand_id == source_brand_id {
                return Err(CoreError::SelfMerge(source_brand_id));
            }
            let enrichment = match (dependents.enrichment_id, survivor_enrichment) {
                (None, _) => EnrichmentAction::Untouched,
                (Some(enrichment_id), Some(_)) => EnrichmentAction::Discard { enrichment_id },
                (Some(enrichment_id), None) => EnrichmentAction::Reassign { enrichment_id },
            };
            (PlanTarget::Survivor { brand_id }, enrichment)
        }
    };

    Ok(MergePlan {
        source_brand_id,
        target,
        sentiment_ids: dependents.sentiment_ids,
        enrichment,
    })
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
