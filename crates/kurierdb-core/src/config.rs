use std::path::PathBuf;

use crate::app_config::AppConfig;
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

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let courier = require("KURIERDB_COURIER")?;

    let log_level = or_default("KURIERDB_LOG_LEVEL", "info");
    let base_url = or_default("KURIERDB_BASE_URL", "http://bamboo-mec.de");
    let cache_dir = PathBuf::from(or_default("KURIERDB_CACHE_DIR", "./downloads"));
    let blueprints_path = PathBuf::from(or_default(
        "KURIERDB_BLUEPRINTS_PATH",
        "./config/blueprints.yaml",
    ));
    let report_path = PathBuf::from(or_default("KURIERDB_REPORT_LOG", "./log/elucidate.log"));

    let http_timeout_secs = parse_u64("KURIERDB_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("KURIERDB_USER_AGENT", "kurierdb/0.1 (harvest)");

    let geo_base_url = or_default(
        "KURIERDB_GEO_BASE_URL",
        "https://nominatim.openstreetmap.org",
    );
    let geo_country = or_default("KURIERDB_GEO_COUNTRY", "Germany");
    let geo_max_attempts = parse_u32("KURIERDB_GEO_MAX_ATTEMPTS", "3")?;
    let geo_backoff_base_ms = parse_u64("KURIERDB_GEO_BACKOFF_BASE_MS", "1000")?;
    let inter_request_delay_ms = parse_u64("KURIERDB_INTER_REQUEST_DELAY_MS", "250")?;

    if geo_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "KURIERDB_GEO_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        log_level,
        courier,
        base_url,
        cache_dir,
        blueprints_path,
        report_path,
        http_timeout_secs,
        user_agent,
        geo_base_url,
        geo_country,
        geo_max_attempts,
        geo_backoff_base_ms,
        inter_request_delay_ms,
    })
}
