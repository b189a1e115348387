use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod model;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use model::{
    Bundle, Checkin, Checkpoint, Client, JobType, Order, PriceCategory, Purpose, RawDocument,
    Stamp,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
