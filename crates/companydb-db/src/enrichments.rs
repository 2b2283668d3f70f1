//! Database operations for the `enrichments_simweb` table.
//!
//! A brand has at most one enrichment, enforced by
//! `enrichments_simweb_brand_id_key`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{PgExecutor, PgPool};

use crate::DbError;

macro_rules! enrichment_columns {
    () => {
        "id, brand_id, enrichment_status, rank, industry, ppc_spend, company_name, \
         annual_revenue, online_revenue, employees, hq_country, hq_state, hq_city, hq_address, \
         hq_postal_code, phone_number, email_address, total_funding, company_linkedin_url, \
         top_country, monthly_visits, mom_traffic_change, yoy_traffic_change, \
         desktop_traffic_share, mobile_traffic_share, bounce_rate, pages_per_visit, \
         visit_duration, similarweb_revenue_estimate, licensing_opportunity_estimate, \
         summary_industry_category, traffic_metrics, created_at, updated_at"
    };
}

// ---------------------------------------------------------------------------
// Row and input types
// ---------------------------------------------------------------------------

/// A row from the `enrichments_simweb` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct EnrichmentRow {
    pub id: i64,
    pub brand_id: i64,
    pub enrichment_status: Option<String>,
    pub rank: Option<i64>,
    pub industry: Option<String>,
    pub ppc_spend: Option<Decimal>,
    pub company_name: Option<String>,
    pub annual_revenue: Option<String>,
    pub online_revenue: Option<String>,
    pub employees: Option<String>,
    pub hq_country: Option<String>,
    pub hq_state: Option<String>,
    pub hq_city: Option<String>,
    pub hq_address: Option<String>,
    pub hq_postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub total_funding: Option<String>,
    pub company_linkedin_url: Option<String>,
    pub top_country: Option<String>,
    pub monthly_visits: Option<String>,
    pub mom_traffic_change: Option<Decimal>,
    pub yoy_traffic_change: Option<Decimal>,
    pub desktop_traffic_share: Option<Decimal>,
    pub mobile_traffic_share: Option<Decimal>,
    pub bounce_rate: Option<Decimal>,
    pub pages_per_visit: Option<Decimal>,
    pub visit_duration: Option<String>,
    pub similarweb_revenue_estimate: Option<i64>,
    pub licensing_opportunity_estimate: Option<i64>,
    pub summary_industry_category: Option<String>,
    /// Per-channel and demographic traffic figures keyed by metric name.
    pub traffic_metrics: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEnrichment {
    pub brand_id: i64,
    pub enrichment_status: Option<String>,
    pub rank: Option<i64>,
    pub industry: Option<String>,
    pub ppc_spend: Option<Decimal>,
    pub company_name: Option<String>,
    pub annual_revenue: Option<String>,
    pub online_revenue: Option<String>,
    pub employees: Option<String>,
    pub hq_country: Option<String>,
    pub hq_state: Option<String>,
    pub hq_city: Option<String>,
    pub hq_address: Option<String>,
    pub hq_postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub total_funding: Option<String>,
    pub company_linkedin_url: Option<String>,
    pub top_country: Option<String>,
    pub monthly_visits: Option<String>,
    pub mom_traffic_change: Option<Decimal>,
    pub yoy_traffic_change: Option<Decimal>,
    pub desktop_traffic_share: Option<Decimal>,
    pub mobile_traffic_share: Option<Decimal>,
    pub bounce_rate: Option<Decimal>,
    pub pages_per_visit: Option<Decimal>,
    pub visit_duration: Option<String>,
    pub similarweb_revenue_estimate: Option<i64>,
    pub licensing_opportunity_estimate: Option<i64>,
    pub summary_industry_category: Option<String>,
    pub traffic_metrics: Option<Value>,
}

/// Metric fields of a `PUT`; `None` keeps the stored value.
///
/// Ownership is not editable here: a body naming `brand_id` is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentUpdate {
    pub enrichment_status: Option<String>,
    pub rank: Option<i64>,
    pub industry: Option<String>,
    pub ppc_spend: Option<Decimal>,
    pub company_name: Option<String>,
    pub annual_revenue: Option<String>,
    pub online_revenue: Option<String>,
    pub employees: Option<String>,
    pub hq_country: Option<String>,
    pub hq_state: Option<String>,
    pub hq_city: Option<String>,
    pub hq_address: Option<String>,
    pub hq_postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub total_funding: Option<String>,
    pub company_linkedin_url: Option<String>,
    pub top_country: Option<String>,
    pub monthly_visits: Option<String>,
    pub mom_traffic_change: Option<Decimal>,
    pub yoy_traffic_change: Option<Decimal>,
    pub desktop_traffic_share: Option<Decimal>,
    pub mobile_traffic_share: Option<Decimal>,
    pub bounce_rate: Option<Decimal>,
    pub pages_per_visit: Option<Decimal>,
    pub visit_duration: Option<String>,
    pub similarweb_revenue_estimate: Option<i64>,
    pub licensing_opportunity_estimate: Option<i64>,
    pub summary_industry_category: Option<String>,
    pub traffic_metrics: Option<Value>,
}

impl NewEnrichment {
    /// An enrichment for `brand_id` with every metric unset.
    #[must_use]
    pub fn for_brand(brand_id: i64) -> Self {
        Self {
            brand_id,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns up to `limit` enrichments, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_enrichments(pool: &PgPool, limit: i64) -> Result<Vec<EnrichmentRow>, DbError> {
    let rows = sqlx::query_as::<_, EnrichmentRow>(concat!(
        "SELECT ",
        enrichment_columns!(),
        " FROM enrichments_simweb ORDER BY id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_enrichment(pool: &PgPool, id: i64) -> Result<Option<EnrichmentRow>, DbError> {
    let row = sqlx::query_as::<_, EnrichmentRow>(concat!(
        "SELECT ",
        enrichment_columns!(),
        " FROM enrichments_simweb WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the enrichment owned by `brand_id`, if it has one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_enrichment_for_brand<'e, E>(
    executor: E,
    brand_id: i64,
) -> Result<Option<EnrichmentRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, EnrichmentRow>(concat!(
        "SELECT ",
        enrichment_columns!(),
        " FROM enrichments_simweb WHERE brand_id = $1"
    ))
    .bind(brand_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Inserts an enrichment.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails: a foreign-key violation for
/// an unknown brand, a unique violation if the brand already has one.
pub async fn create_enrichment(
    pool: &PgPool,
    enrichment: &NewEnrichment,
) -> Result<EnrichmentRow, DbError> {
    let row = sqlx::query_as::<_, EnrichmentRow>(concat!(
        "INSERT INTO enrichments_simweb (brand_id, enrichment_status, rank, industry, ppc_spend, \
             company_name, annual_revenue, online_revenue, employees, hq_country, hq_state, \
             hq_city, hq_address, hq_postal_code, phone_number, email_address, total_funding, \
             company_linkedin_url, top_country, monthly_visits, mom_traffic_change, \
             yoy_traffic_change, desktop_traffic_share, mobile_traffic_share, bounce_rate, \
             pages_per_visit, visit_duration, similarweb_revenue_estimate, \
             licensing_opportunity_estimate, summary_industry_category, traffic_metrics) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, \
                 COALESCE($31, '{}'::jsonb)) \
         RETURNING ",
        enrichment_columns!()
    ))
    .bind(enrichment.brand_id)
    .bind(&enrichment.enrichment_status)
    .bind(enrichment.rank)
    .bind(&enrichment.industry)
    .bind(enrichment.ppc_spend)
    .bind(&enrichment.company_name)
    .bind(&enrichment.annual_revenue)
    .bind(&enrichment.online_revenue)
    .bind(&enrichment.employees)
    .bind(&enrichment.hq_country)
    .bind(&enrichment.hq_state)
    .bind(&enrichment.hq_city)
    .bind(&enrichment.hq_address)
    .bind(&enrichment.hq_postal_code)
    .bind(&enrichment.phone_number)
    .bind(&enrichment.email_address)
    .bind(&enrichment.total_funding)
    .bind(&enrichment.company_linkedin_url)
    .bind(&enrichment.top_country)
    .bind(&enrichment.monthly_visits)
    .bind(enrichment.mom_traffic_change)
    .bind(enrichment.yoy_traffic_change)
    .bind(enrichment.desktop_traffic_share)
    .bind(enrichment.mobile_traffic_share)
    .bind(enrichment.bounce_rate)
    .bind(enrichment.pages_per_visit)
    .bind(&enrichment.visit_duration)
    .bind(enrichment.similarweb_revenue_estimate)
    .bind(enrichment.licensing_opportunity_estimate)
    .bind(&enrichment.summary_industry_category)
    .bind(&enrichment.traffic_metrics)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies the supplied metrics of `update` to an enrichment.
/// `traffic_metrics` keys are merged into the stored object.
///
/// Returns `None` if the enrichment does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_enrichment(
    pool: &PgPool,
    id: i64,
    update: &EnrichmentUpdate,
) -> Result<Option<EnrichmentRow>, DbError> {
    let row = sqlx::query_as::<_, EnrichmentRow>(concat!(
        "UPDATE enrichments_simweb \
         SET enrichment_status = COALESCE($2, enrichment_status), \
             rank = COALESCE($3, rank), \
             industry = COALESCE($4, industry), \
             ppc_spend = COALESCE($5, ppc_spend), \
             company_name = COALESCE($6, company_name), \
             annual_revenue = COALESCE($7, annual_revenue), \
             online_revenue = COALESCE($8, online_revenue), \
             employees = COALESCE($9, employees), \
             hq_country = COALESCE($10, hq_country), \
             hq_state = COALESCE($11, hq_state), \
             hq_city = COALESCE($12, hq_city), \
             hq_address = COALESCE($13, hq_address), \
             hq_postal_code = COALESCE($14, hq_postal_code), \
             phone_number = COALESCE($15, phone_number), \
             email_address = COALESCE($16, email_address), \
             total_funding = COALESCE($17, total_funding), \
             company_linkedin_url = COALESCE($18, company_linkedin_url), \
             top_country = COALESCE($19, top_country), \
             monthly_visits = COALESCE($20, monthly_visits), \
             mom_traffic_change = COALESCE($21, mom_traffic_change), \
             yoy_traffic_change = COALESCE($22, yoy_traffic_change), \
             desktop_traffic_share = COALESCE($23, desktop_traffic_share), \
             mobile_traffic_share = COALESCE($24, mobile_traffic_share), \
             bounce_rate = COALESCE($25, bounce_rate), \
             pages_per_visit = COALESCE($26, pages_per_visit), \
             visit_duration = COALESCE($27, visit_duration), \
             similarweb_revenue_estimate = COALESCE($28, similarweb_revenue_estimate), \
             licensing_opportunity_estimate = COALESCE($29, licensing_opportunity_estimate), \
             summary_industry_category = COALESCE($30, summary_industry_category), \
             traffic_metrics = COALESCE(traffic_metrics || $31, traffic_metrics), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        enrichment_columns!()
    ))
    .bind(id)
    .bind(&update.enrichment_status)
    .bind(update.rank)
    .bind(&update.industry)
    .bind(update.ppc_spend)
    .bind(&update.company_name)
    .bind(&update.annual_revenue)
    .bind(&update.online_revenue)
    .bind(&update.employees)
    .bind(&update.hq_country)
    .bind(&update.hq_state)
    .bind(&update.hq_city)
    .bind(&update.hq_address)
    .bind(&update.hq_postal_code)
    .bind(&update.phone_number)
    .bind(&update.email_address)
    .bind(&update.total_funding)
    .bind(&update.company_linkedin_url)
    .bind(&update.top_country)
    .bind(&update.monthly_visits)
    .bind(update.mom_traffic_change)
    .bind(update.yoy_traffic_change)
    .bind(update.desktop_traffic_share)
    .bind(update.mobile_traffic_share)
    .bind(update.bounce_rate)
    .bind(update.pages_per_visit)
    .bind(&update.visit_duration)
    .bind(update.similarweb_revenue_estimate)
    .bind(update.licensing_opportunity_estimate)
    .bind(&update.summary_industry_category)
    .bind(&update.traffic_metrics)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_enrichment(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM enrichments_simweb WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
