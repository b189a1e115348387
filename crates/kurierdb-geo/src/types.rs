use std::fmt;

/// Structured address fields scraped off a job document, plus the country
/// every lookup is constrained to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
}

impl AddressQuery {
    /// Single-line rendition of whatever fields are present, used both as the
    /// free-form fallback query and as the identity of an unresolvable stop.
    #[must_use]
    pub fn free_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        if let Some(street) = self.street.as_deref() {
            parts.push(street);
        }
        if let Some(postal_code) = self.postal_code.as_deref() {
            parts.push(postal_code);
        }
        if let Some(city) = self.city.as_deref() {
            parts.push(city);
        }
        parts.push(&self.country);
        parts.join(", ")
    }

    /// True when there is nothing to look up besides the country.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.street.is_none() && self.city.is_none() && self.postal_code.is_none()
    }
}

impl fmt::Display for AddressQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.free_text())
    }
}

/// One resolved location as returned by the geocoding service.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPoint {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    pub place_id: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    /// Set when the service could not pin the exact house number and fell
    /// back to a coarser match. Accepted, but worth a log line.
    pub partial_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_skips_absent_fields() {
        let query = AddressQuery {
            street: Some("Torstraße 125".to_owned()),
            city: None,
            postal_code: Some("10119".to_owned()),
            country: "Germany".to_owned(),
        };
        assert_eq!(query.free_text(), "Torstraße 125, 10119, Germany");
    }

    #[test]
    fn country_only_query_counts_as_empty() {
        let query = AddressQuery {
            street: None,
            city: None,
            postal_code: None,
            country: "Germany".to_owned(),
        };
        assert!(query.is_empty());
        assert_eq!(query.free_text(), "Germany");
    }
}
