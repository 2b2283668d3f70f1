//! Duplicate detection: classify a requested website against live brands.

use companydb_core::Website;
use sqlx::PgConnection;

use crate::brands::BrandRow;
use crate::DbError;

/// How a requested website relates to the brand being updated.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityChange {
    /// No website requested, or it equals the current one.
    Unchanged,
    /// No other brand owns the website.
    Free(Website),
    /// Another live brand owns the website; its row is locked.
    Collision { survivor: BrandRow },
}

/// Locks and returns the brand being reconciled.
///
/// Holding `FOR UPDATE` on the source row blocks concurrent inserts of
/// dependents into it, since their foreign-key checks need a key-share lock.
pub(super) async fn lock_brand(
    conn: &mut PgConnection,
    brand_id: i64,
) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, website, contact_name, contact_email, contact_phone, \
                entity_type, fixed_entity_type, apollo_enrichment, created_at, updated_at \
         FROM brands \
         WHERE id = $1 \
         FOR UPDATE",
    )
    .bind(brand_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Classifies `candidate` relative to `source`.
///
/// Comparison is against the stored website, never the display name.
pub(super) async fn classify(
    conn: &mut PgConnection,
    source: &BrandRow,
    candidate: Option<Website>,
) -> Result<IdentityChange, DbError> {
    let Some(website) = candidate else {
        return Ok(IdentityChange::Unchanged);
    };
    if website.as_str() == source.website {
        return Ok(IdentityChange::Unchanged);
    }

    let owner = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, website, contact_name, contact_email, contact_phone, \
                entity_type, fixed_entity_type, apollo_enrichment, created_at, updated_at \
         FROM brands \
         WHERE website = $1 AND id <> $2 \
         FOR UPDATE",
    )
    .bind(website.as_str())
    .bind(source.id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(match owner {
        Some(survivor) => IdentityChange::Collision { survivor },
        None => IdentityChange::Free(website),
    })
}
