use kurierdb_core::{
    AppConfig, Bundle, Checkin, Checkpoint, Client, JobType, Order, Purpose,
};
use kurierdb_extract::{RawFields, ScrapedRecord};
use kurierdb_geo::{AddressQuery, Locate};

use crate::coerce::{parse_decimal, parse_i64, time_on_day};
use crate::enrich::locate_with_retry;
use crate::error::NormalizeError;
use crate::identity;
use crate::prices;

/// Turns scraped records into archivable bundles: coerces types, aggregates
/// prices, geocodes checkpoints, and derives stable identities.
pub struct Normalizer<'a, L: Locate> {
    locator: &'a L,
    config: &'a AppConfig,
}

impl<'a, L: Locate> Normalizer<'a, L> {
    #[must_use]
    pub fn new(locator: &'a L, config: &'a AppConfig) -> Self {
        Self { locator, config }
    }

    /// Normalizes one record into a [`Bundle`].
    ///
    /// # Errors
    ///
    /// Fails only when the record cannot be anchored in the data model: a
    /// missing or unparseable order id, client id, or job id. Every other
    /// defect degrades to an absent value, a skipped address pair, or an
    /// ungeocoded checkpoint.
    pub async fn process(&self, record: &ScrapedRecord) -> Result<Bundle, NormalizeError> {
        let stamp = &record.stamp;

        let client_id = required_i64(&record.info, "client_id", stamp)?;
        let order_id = required_i64(&record.info, "order_id", stamp)?;
        let uuid = parse_i64(&stamp.job_id).ok_or_else(|| NormalizeError::InvalidField {
            stamp: stamp.to_string(),
            field: "job_id",
            value: stamp.job_id.clone(),
        })?;

        let client = Client {
            client_id,
            name: record.info.get("client_name").map(str::to_owned),
        };

        let job_type = record.info.get("type").and_then(|raw| {
            let parsed = JobType::from_source(raw);
            if parsed.is_none() {
                tracing::warn!(%stamp, raw, "unknown job type");
            }
            parsed
        });
        let distance = record.info.get("km").and_then(|raw| {
            let parsed = parse_decimal(raw);
            if parsed.is_none() {
                tracing::warn!(%stamp, raw, "unparseable distance");
            }
            parsed
        });

        let order = Order {
            order_id,
            client_id,
            uuid,
            date: stamp.date,
            courier: stamp.courier.clone(),
            job_type,
            // The header carries a marker only when the job was paid in cash;
            // its absence means nothing either way.
            cash: record.info.get("cash").map(|_| true),
            distance,
            amounts: prices::aggregate(stamp, &record.prices),
        };

        let mut checkpoints: Vec<Checkpoint> = Vec::new();
        let mut checkins = Vec::new();
        for fields in &record.addresses {
            let query = AddressQuery {
                street: fields.get("street").map(str::to_owned),
                city: fields.get("city").map(str::to_owned),
                postal_code: fields.get("postal_code").map(str::to_owned),
                country: self.config.geo_country.clone(),
            };
            if query.is_empty() {
                tracing::warn!(%stamp, "address block without usable text, skipping stop");
                continue;
            }

            let point = locate_with_retry(
                self.locator,
                &query,
                self.config.geo_max_attempts,
                self.config.geo_backoff_base_ms,
            )
            .await;

            let checkpoint_id = point
                .as_ref()
                .map_or_else(|| query.free_text(), |p| p.display_name.clone());

            let purpose = fields.get("purpose").and_then(Purpose::from_source);
            let after_time = fields
                .get("after")
                .and_then(|raw| time_on_day(raw, stamp.date));
            let until_time = fields
                .get("until")
                .and_then(|raw| time_on_day(raw, stamp.date));
            let timestamp = fields
                .get("timestamp")
                .and_then(|raw| time_on_day(raw, stamp.date));

            checkins.push(Checkin {
                checkin_id: identity::checkin_id(
                    &checkpoint_id,
                    order_id,
                    purpose,
                    after_time,
                    until_time,
                    timestamp,
                ),
                checkpoint_id: checkpoint_id.clone(),
                order_id,
                purpose,
                timestamp,
                after_time,
                until_time,
            });

            // Both stops of a round trip may resolve to the same place.
            if checkpoints.iter().any(|c| c.checkpoint_id == checkpoint_id) {
                continue;
            }
            checkpoints.push(Checkpoint {
                checkpoint_id,
                lat: point.as_ref().map(|p| p.lat),
                lon: point.as_ref().map(|p| p.lon),
                place_id: point.as_ref().and_then(|p| p.place_id.clone()),
                company: fields.get("company").map(str::to_owned),
                street: fields.get("street").map(str::to_owned),
                city: fields.get("city").map(str::to_owned),
                postal_code: fields.get("postal_code").map(str::to_owned),
                country: point.as_ref().and_then(|p| p.country.clone()),
                street_name: point.as_ref().and_then(|p| p.street_name.clone()),
                street_number: point.as_ref().and_then(|p| p.street_number.clone()),
                as_scraped: as_scraped(fields),
            });
        }

        Ok(Bundle {
            client,
            order,
            checkpoints,
            checkins,
        })
    }
}

fn required_i64(
    info: &RawFields,
    field: &'static str,
    stamp: &kurierdb_core::Stamp,
) -> Result<i64, NormalizeError> {
    let raw = info.get(field).ok_or_else(|| NormalizeError::MissingField {
        stamp: stamp.to_string(),
        field,
    })?;
    parse_i64(raw).ok_or_else(|| NormalizeError::InvalidField {
        stamp: stamp.to_string(),
        field,
        value: raw.to_owned(),
    })
}

/// Single-line rendition of the address exactly as it stood in the document.
fn as_scraped(fields: &RawFields) -> String {
    ["company", "street", "postal_code", "city"]
        .iter()
        .filter_map(|name| fields.get(name))
        .collect::<Vec<_>>()
        .join(", ")
}
