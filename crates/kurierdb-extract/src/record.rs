use std::collections::BTreeMap;

use kurierdb_core::{PriceCategory, Stamp};

/// Raw field values collected from one section. A field that could not be
/// located is simply not present; [`RawFields::get`] returns `None` for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields(BTreeMap<String, String>);

impl RawFields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Everything extracted from one raw document. All values are raw strings;
/// type coercion happens in the pipeline crate.
#[derive(Debug, Clone)]
pub struct ScrapedRecord {
    pub stamp: Stamp,
    /// Scalar fields from the header, client, and itinerary sections.
    pub info: RawFields,
    /// Raw amount tokens per canonical price category. A category may carry
    /// several line items (e.g. repeated waiting-time rows on one job).
    pub prices: BTreeMap<PriceCategory, Vec<String>>,
    /// One entry per address block, in document order.
    pub addresses: Vec<RawFields>,
}
