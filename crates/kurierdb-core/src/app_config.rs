use std::path::PathBuf;

/// Process-wide configuration, constructed once at startup and passed by
/// reference into each component. Nothing in the pipeline reads the
/// environment after this value exists.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    /// Source-user tag stamped onto every harvested record.
    pub courier: String,
    /// Base URL of the dispatch website.
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub blueprints_path: PathBuf,
    /// Append-only destination for extraction-failure reports.
    pub report_path: PathBuf,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub geo_base_url: String,
    /// Country constraint sent with every geocoding query.
    pub geo_country: String,
    /// Total attempts per address, first try included.
    pub geo_max_attempts: u32,
    pub geo_backoff_base_ms: u64,
    pub inter_request_delay_ms: u64,
}
