use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::GeoError;
use crate::types::{AddressQuery, GeocodedPoint};
use crate::Locate;

/// Geocoding client for a Nominatim-compatible search endpoint.
///
/// Tries a structured query first and falls back to a free-form one when the
/// structured lookup comes back empty. Use [`NominatimClient::with_base_url`]
/// to point at a mock server in tests.
pub struct NominatimClient {
    client: Client,
    base_url: Url,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the HTTP client cannot be constructed,
    /// or [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    async fn search(&self, params: &[(&str, &str)]) -> Result<Vec<Place>, GeoError> {
        let mut url = self.base_url.clone();
        url.set_path("search");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "jsonv2");
            pairs.append_pair("addressdetails", "1");
            pairs.append_pair("limit", "1");
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
            context: "search".to_owned(),
            source: e,
        })
    }
}

impl Locate for NominatimClient {
    /// Resolves `query` to a [`GeocodedPoint`].
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NoMatch`] when neither the structured nor the
    /// free-form lookup finds anything, and the transport errors of
    /// [`GeoError`] otherwise.
    async fn locate(&self, query: &AddressQuery) -> Result<GeocodedPoint, GeoError> {
        let mut params: Vec<(&str, &str)> = vec![("country", &query.country)];
        if let Some(street) = query.street.as_deref() {
            params.push(("street", street));
        }
        if let Some(city) = query.city.as_deref() {
            params.push(("city", city));
        }
        if let Some(postal_code) = query.postal_code.as_deref() {
            params.push(("postalcode", postal_code));
        }

        let mut places = self.search(&params).await?;
        if places.is_empty() {
            // Scraped addresses are messy; the free-form parser copes with
            // company names and floor suffixes the structured one rejects.
            let free_text = query.free_text();
            tracing::debug!(query = %free_text, "structured lookup empty, trying free-form");
            places = self.search(&[("q", &free_text)]).await?;
        }

        let Some(place) = places.into_iter().next() else {
            return Err(GeoError::NoMatch {
                query: query.free_text(),
            });
        };
        place.into_point(query)
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    place_id: Option<i64>,
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: PlaceAddress,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceAddress {
    road: Option<String>,
    house_number: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

impl Place {
    fn into_point(self, query: &AddressQuery) -> Result<GeocodedPoint, GeoError> {
        let lat = parse_coordinate(&self.lat)?;
        let lon = parse_coordinate(&self.lon)?;
        // A street in the query without a house number in the answer means
        // the service settled for the road or the neighbourhood.
        let partial_match = query.street.is_some() && self.address.house_number.is_none();
        let city = self
            .address
            .city
            .or(self.address.town)
            .or(self.address.village);

        Ok(GeocodedPoint {
            lat,
            lon,
            display_name: self.display_name,
            place_id: self.place_id.map(|id| id.to_string()),
            country: self.address.country,
            city,
            postal_code: self.address.postcode,
            street_name: self.address.road,
            street_number: self.address.house_number,
            partial_match,
        })
    }
}

fn parse_coordinate(value: &str) -> Result<f64, GeoError> {
    value
        .parse()
        .map_err(|_| GeoError::InvalidCoordinates {
            value: value.to_owned(),
        })
}
