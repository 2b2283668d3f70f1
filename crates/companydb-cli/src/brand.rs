//! Brand command handlers for the CLI.
//!
//! `set-website` runs the same reconciliation as `PATCH /api/v1/brands/{id}`
//! and prints the resulting audit trail as JSON on stdout.

use clap::Subcommand;
use companydb_core::BrandPatch;
use companydb_db::{BrandUpdate, ReconcileError};

/// Sub-commands available under `brand`.
#[derive(Debug, Subcommand)]
pub enum BrandCommands {
    /// List the newest brands
    List {
        /// Maximum number of brands to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Print one brand as JSON
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Change a brand's website, renaming or merging as needed
    SetWebsite {
        #[arg(long)]
        id: i64,
        /// Bare domain, e.g. acme.com
        #[arg(long)]
        website: String,
        /// Also update the display name
        #[arg(long)]
        name: Option<String>,
    },
}

pub(crate) async fn run(pool: &sqlx::PgPool, command: BrandCommands) -> anyhow::Result<()> {
    match command {
        BrandCommands::List { limit } => {
            let brands = companydb_db::list_brands(pool, limit).await?;
            if brands.is_empty() {
                println!("no brands");
            }
            for brand in brands {
                println!("{:>8}  {:<40}  {}", brand.id, brand.website, brand.name);
            }
        }
        BrandCommands::Show { id } => {
            let brand = companydb_db::get_brand(pool, id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("brand {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&brand)?);
        }
        BrandCommands::SetWebsite { id, website, name } => {
            let update = set_website_update(website, name);
            let outcome = companydb_db::update_brand(pool, id, &update)
                .await
                .map_err(describe_reconcile_error)?;
            tracing::info!(
                brand_id = id,
                canonical_brand_id = outcome.canonical_brand().id,
                "brand website set"
            );
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}

fn set_website_update(website: String, name: Option<String>) -> BrandUpdate {
    BrandUpdate {
        website: Some(website),
        patch: BrandPatch {
            name,
            ..BrandPatch::default()
        },
    }
}

fn describe_reconcile_error(error: ReconcileError) -> anyhow::Error {
    match error {
        ReconcileError::InvalidIdentityFormat(raw) => {
            anyhow::anyhow!("{raw:?} is not a bare domain (drop any http://, https:// or www prefix)")
        }
        ReconcileError::TransactionConflict(reason) => {
            anyhow::anyhow!("brand changed concurrently, nothing was written; retry ({reason})")
        }
        other => anyhow::Error::new(other),
    }
}
