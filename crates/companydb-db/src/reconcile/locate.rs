//! Dependent-record location within the reconciliation transaction.

use companydb_core::DependentSet;
use sqlx::PgConnection;

use crate::DbError;

/// Finds every sentiment and the enrichment owned by `brand_id`, locking
/// them until the transaction ends.
///
/// The caller must already hold the brand's row lock so nothing can be
/// attached to it between locating and reassigning.
pub(super) async fn dependents(
    conn: &mut PgConnection,
    brand_id: i64,
) -> Result<DependentSet, DbError> {
    let sentiment_ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM sentiments WHERE brand_id = $1 ORDER BY id FOR UPDATE",
    )
    .bind(brand_id)
    .fetch_all(&mut *conn)
    .await?;

    let enrichment_id = enrichment_of(conn, brand_id).await?;

    Ok(DependentSet {
        sentiment_ids,
        enrichment_id,
    })
}

/// The id of the enrichment owned by `brand_id`, locked for update.
pub(super) async fn enrichment_of(
    conn: &mut PgConnection,
    brand_id: i64,
) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM enrichments_simweb WHERE brand_id = $1 FOR UPDATE",
    )
    .bind(brand_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(id)
}
