//! Cache-aware retrieval of raw job documents, one calendar day at a time.
//!
//! The fetcher never silently accepts a partial day: a network failure during
//! discovery or document retrieval aborts the whole day. Successful fetches
//! are cached on disk so that re-running ingestion serves from cache, and a
//! day already checked and found empty is remembered with a sentinel file.

mod cache;
mod error;
mod fetch;
mod session;

pub use cache::DocumentCache;
pub use error::FetchError;
pub use fetch::Fetcher;
pub use session::Session;
