//! Geocoding with a bounded retry loop.
//!
//! Enrichment never fails a record over the geocoder: after the attempt
//! budget is spent (or a final error comes back) the checkpoint is built from
//! the scraped text alone.

use std::time::Duration;

use kurierdb_geo::{AddressQuery, GeocodedPoint, Locate};

const MAX_DELAY_MS: u64 = 60_000;

/// Resolves `query`, spending at most `max_attempts` calls on the locator.
/// Only transient errors are retried, with exponential back-off and jitter.
/// Returns `None` when the address stays unresolved for whatever reason.
pub(crate) async fn locate_with_retry(
    locator: &impl Locate,
    query: &AddressQuery,
    max_attempts: u32,
    backoff_base_ms: u64,
) -> Option<GeocodedPoint> {
    let max_attempts = max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match locator.locate(query).await {
            Ok(point) => {
                if point.partial_match {
                    tracing::info!(%query, resolved = %point.display_name, "partial geocoder match accepted");
                }
                return Some(point);
            }
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "transient geocoder error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => {
                tracing::warn!(%query, attempt, error = %err, "address stays unresolved");
                return None;
            }
        }
    }
    None
}
