//! SQLite persistence for harvested bundles.
//!
//! Archiving is merge-only: every insert carries `ON CONFLICT DO NOTHING`,
//! so re-archiving a day is idempotent and two records referring to the same
//! checkpoint coexist peacefully.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

mod archive;

pub use archive::{archive, ArchiveStats};

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/kurierdb-db/Cargo.toml; resolves to
// <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid database URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: sqlx::Error,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Opens (and if needed creates) the SQLite database and runs pending
/// migrations.
///
/// # Errors
///
/// Returns [`DbError::InvalidUrl`] for an unparseable URL, [`DbError::Sqlx`]
/// if the pool cannot be opened, or [`DbError::Migration`] if a migration
/// fails.
pub async fn connect(database_url: &str) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| DbError::InvalidUrl {
            url: database_url.to_owned(),
            source: e,
        })?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    Ok(pool)
}
