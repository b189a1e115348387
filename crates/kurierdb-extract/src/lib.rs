//! Blueprint-driven field extraction from raw job documents.
//!
//! The extractor is total: for any input document, well-formed or not, it
//! returns a complete [`ScrapedRecord`]. "Could not determine field X" is
//! represented as data (the field is absent), never as an error. Required
//! fields that could not be located additionally produce a [`Report`] for the
//! diagnostic log.

mod blueprint;
mod error;
mod extract;
mod record;
mod report;

pub use blueprint::Blueprints;
pub use error::ExtractError;
pub use extract::Extractor;
pub use record::{RawFields, ScrapedRecord};
pub use report::Report;
