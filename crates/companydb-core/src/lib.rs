pub mod app_config;
pub mod brands;
pub mod catalog;
pub mod config;
pub mod identity;
pub mod merge;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use brands::{BrandDraft, BrandPatch};
pub use catalog::{FixedEntityType, Licensability, LinkSource, SentimentLabel};
pub use config::{load_app_config, load_app_config_from_env};
pub use identity::Website;
pub use merge::{plan_merge, DependentSet, EnrichmentAction, MergePlan, MergeTarget, PlanTarget};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("website format is invalid: {0}")]
    InvalidIdentityFormat(String),
    #[error("brand {0} cannot be merged into itself")]
    SelfMerge(i64),
    #[error("unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
