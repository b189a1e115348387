//! Address resolution against a Nominatim-compatible geocoding service.
//!
//! The [`Locate`] trait is the seam between enrichment and the network:
//! production code uses [`NominatimClient`], tests substitute a fake.

use std::future::Future;

mod client;
mod error;
mod types;

pub use client::NominatimClient;
pub use error::GeoError;
pub use types::{AddressQuery, GeocodedPoint};

/// Resolves a scraped address to coordinates and canonical address fields.
pub trait Locate {
    fn locate(
        &self,
        query: &AddressQuery,
    ) -> impl Future<Output = Result<GeocodedPoint, GeoError>> + Send;
}
