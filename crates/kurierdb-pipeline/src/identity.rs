//! Deterministic identities for checkins.
//!
//! A checkin has no natural key in the source, so its identity is a digest of
//! everything that identifies the stop. Re-processing the same document
//! always derives the same id, which is what makes archiving idempotent.

use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};

use kurierdb_core::Purpose;

pub(crate) fn checkin_id(
    checkpoint_id: &str,
    order_id: i64,
    purpose: Option<Purpose>,
    after_time: Option<NaiveDateTime>,
    until_time: Option<NaiveDateTime>,
    timestamp: Option<NaiveDateTime>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(checkpoint_id.as_bytes());
    hasher.update([0]);
    hasher.update(order_id.to_string().as_bytes());
    hasher.update([0]);
    hasher.update(purpose.map(Purpose::as_str).unwrap_or_default().as_bytes());
    hasher.update([0]);
    hasher.update(render(after_time).as_bytes());
    hasher.update([0]);
    hasher.update(render(until_time).as_bytes());
    hasher.update([0]);
    hasher.update(render(timestamp).as_bytes());

    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn render(value: Option<NaiveDateTime>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
