//! Normalization and enrichment of scraped records.
//!
//! The normalizer is total over everything but the record's anchor ids: a
//! defect in any other field degrades locally (absent value, skipped stop,
//! ungeocoded checkpoint) instead of failing the record.

mod coerce;
mod enrich;
mod error;
mod identity;
mod normalize;
mod prices;

pub use error::NormalizeError;
pub use normalize::Normalizer;
