use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain map.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("COMPANYDB_ENV", "development"));

    let bind_addr = or_default("COMPANYDB_BIND_ADDR", "0.0.0.0:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("COMPANYDB_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("COMPANYDB_LOG_LEVEL", "info");

    let db_max_connections = or_default("COMPANYDB_DB_MAX_CONNECTIONS", "10")
        .parse::<u32>()
        .map_err(|e| invalid("COMPANYDB_DB_MAX_CONNECTIONS", e.to_string()))?;
    let db_min_connections = or_default("COMPANYDB_DB_MIN_CONNECTIONS", "1")
        .parse::<u32>()
        .map_err(|e| invalid("COMPANYDB_DB_MIN_CONNECTIONS", e.to_string()))?;
    let db_acquire_timeout_secs = or_default("COMPANYDB_DB_ACQUIRE_TIMEOUT_SECS", "10")
        .parse::<u64>()
        .map_err(|e| invalid("COMPANYDB_DB_ACQUIRE_TIMEOUT_SECS", e.to_string()))?;

    if db_min_connections > db_max_connections {
        return Err(invalid(
            "COMPANYDB_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds max connections {db_max_connections}"),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
