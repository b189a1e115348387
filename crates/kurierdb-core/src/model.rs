//! Domain entities produced by the normalizer and persisted by the archiver.
//!
//! The hat characters represent many-to-one relationships:
//!
//! ```text
//!     Clients
//!        |
//!        ^
//!      Orders   Checkpoints
//!         |        |
//!         ^        ^
//!          Checkins
//! ```

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The (source-user, date, job-id) triple identifying one source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub courier: String,
    pub date: NaiveDate,
    pub job_id: String,
}

impl std::fmt::Display for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-job-{}", self.date.format("%Y-%m-%d"), self.job_id)
    }
}

/// One immutable markup document fetched (or served from cache) for a stamp.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub stamp: Stamp,
    pub html: String,
}

/// Job type as advertised in the document header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    CityTour,
    Overnight,
    Service,
}

impl JobType {
    /// Maps the source vocabulary onto the canonical enumeration.
    #[must_use]
    pub fn from_source(raw: &str) -> Option<Self> {
        match raw {
            "Stadtkurier" => Some(Self::CityTour),
            "OV" => Some(Self::Overnight),
            "Ladehilfe" => Some(Self::Service),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CityTour => "city_tour",
            Self::Overnight => "overnight",
            Self::Service => "service",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the courier stopped at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Pickup,
    Dropoff,
}

impl Purpose {
    #[must_use]
    pub fn from_source(raw: &str) -> Option<Self> {
        match raw {
            "Abholung" => Some(Self::Pickup),
            "Zustellung" => Some(Self::Dropoff),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Dropoff => "dropoff",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical price categories. The source has used many human-readable labels
/// for the same physical category over time; the blueprint file owns that
/// label table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    CityTour,
    ExtraStops,
    Overnight,
    FaxConfirm,
    WaitingTime,
    Service,
}

impl PriceCategory {
    pub const ALL: [Self; 6] = [
        Self::CityTour,
        Self::ExtraStops,
        Self::Overnight,
        Self::FaxConfirm,
        Self::WaitingTime,
        Self::Service,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CityTour => "city_tour",
            Self::ExtraStops => "extra_stops",
            Self::Overnight => "overnight",
            Self::FaxConfirm => "fax_confirm",
            Self::WaitingTime => "waiting_time",
            Self::Service => "service",
        }
    }
}

impl std::fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub client_id: i64,
    pub name: Option<String>,
}

/// One job. Price categories absent in the source are absent from `amounts`;
/// zero and absent stay distinguishable all the way into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: i64,
    pub client_id: i64,
    /// 7-digit job id from the source URL.
    pub uuid: i64,
    pub date: NaiveDate,
    pub courier: String,
    pub job_type: Option<JobType>,
    pub cash: Option<bool>,
    pub distance: Option<Decimal>,
    pub amounts: BTreeMap<PriceCategory, Decimal>,
}

/// A place the courier has checked in at. The identity is the resolved (or,
/// when geocoding failed, raw) normalized address string, so checkpoints
/// naturally deduplicate across records referring to the same place.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub checkpoint_id: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub place_id: Option<String>,
    pub company: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    /// The address text exactly as scraped, kept for auditing.
    pub as_scraped: String,
}

/// One stop of one order. The identity is a deterministic digest of the
/// identifying fields, computed in the pipeline crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkin {
    pub checkin_id: String,
    pub checkpoint_id: String,
    pub order_id: i64,
    pub purpose: Option<Purpose>,
    pub timestamp: Option<NaiveDateTime>,
    pub after_time: Option<NaiveDateTime>,
    pub until_time: Option<NaiveDateTime>,
}

/// Everything derived from one scraped record, ready for archiving.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub client: Client,
    pub order: Order,
    pub checkpoints: Vec<Checkpoint>,
    pub checkins: Vec<Checkin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_type_source_vocabulary() {
        assert_eq!(JobType::from_source("Stadtkurier"), Some(JobType::CityTour));
        assert_eq!(JobType::from_source("OV"), Some(JobType::Overnight));
        assert_eq!(JobType::from_source("Ladehilfe"), Some(JobType::Service));
        assert_eq!(JobType::from_source("Fernfahrt"), None);
    }

    #[test]
    fn purpose_source_vocabulary() {
        assert_eq!(Purpose::from_source("Abholung"), Some(Purpose::Pickup));
        assert_eq!(Purpose::from_source("Zustellung"), Some(Purpose::Dropoff));
        assert_eq!(Purpose::from_source("Pause"), None);
    }

    #[test]
    fn price_category_yaml_names() {
        let cat: PriceCategory = serde_json::from_str("\"extra_stops\"").unwrap();
        assert_eq!(cat, PriceCategory::ExtraStops);
        assert_eq!(cat.as_str(), "extra_stops");
    }

    #[test]
    fn stamp_display_matches_cache_naming() {
        let stamp = Stamp {
            courier: "m-134".to_string(),
            date: NaiveDate::from_ymd_opt(2014, 2, 12).unwrap(),
            job_id: "2041699".to_string(),
        };
        assert_eq!(stamp.to_string(), "2014-02-12-job-2041699");
    }
}
