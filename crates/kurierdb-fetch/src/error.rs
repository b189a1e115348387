use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure from the underlying HTTP client. Fatal for the
    /// day being fetched.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("cache I/O error at {path}: {source}")]
    CacheIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Offline mode was asked for a day the cache knows nothing about.
    #[error("no cached documents for {day} and network access is disabled")]
    OfflineCacheMiss { day: NaiveDate },
}
