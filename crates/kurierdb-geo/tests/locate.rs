//! Integration tests for the geocoding client against a wiremock server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kurierdb_geo::{AddressQuery, GeoError, Locate, NominatimClient};

fn client(server: &MockServer) -> NominatimClient {
    NominatimClient::with_base_url(&server.uri(), 5, "kurierdb-test").unwrap()
}

fn torstrasse() -> AddressQuery {
    AddressQuery {
        street: Some("Torstraße 125".to_owned()),
        city: Some("Berlin".to_owned()),
        postal_code: Some("10119".to_owned()),
        country: "Germany".to_owned(),
    }
}

fn full_match_body() -> serde_json::Value {
    json!([{
        "place_id": 158_741_152,
        "lat": "52.5296187",
        "lon": "13.4012007",
        "display_name": "125, Torstraße, Mitte, Berlin, 10119, Deutschland",
        "address": {
            "house_number": "125",
            "road": "Torstraße",
            "city": "Berlin",
            "postcode": "10119",
            "country": "Deutschland"
        }
    }])
}

#[tokio::test]
async fn structured_lookup_resolves_all_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("street", "Torstraße 125"))
        .and(query_param("city", "Berlin"))
        .and(query_param("postalcode", "10119"))
        .and(query_param("country", "Germany"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_match_body()))
        .expect(1)
        .mount(&server)
        .await;

    let point = client(&server).locate(&torstrasse()).await.unwrap();

    assert!((point.lat - 52.529_618_7).abs() < 1e-9);
    assert!((point.lon - 13.401_200_7).abs() < 1e-9);
    assert_eq!(point.place_id.as_deref(), Some("158741152"));
    assert_eq!(point.street_name.as_deref(), Some("Torstraße"));
    assert_eq!(point.street_number.as_deref(), Some("125"));
    assert_eq!(point.city.as_deref(), Some("Berlin"));
    assert_eq!(point.postal_code.as_deref(), Some("10119"));
    assert_eq!(point.country.as_deref(), Some("Deutschland"));
    assert!(!point.partial_match);
}

#[tokio::test]
async fn empty_structured_answer_falls_back_to_free_form() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("street", "Torstraße 125"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Torstraße 125, 10119, Berlin, Germany"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_match_body()))
        .expect(1)
        .mount(&server)
        .await;

    let point = client(&server).locate(&torstrasse()).await.unwrap();
    assert_eq!(point.display_name, "125, Torstraße, Mitte, Berlin, 10119, Deutschland");
}

#[tokio::test]
async fn two_empty_answers_are_a_final_no_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server).locate(&torstrasse()).await.unwrap_err();
    assert!(matches!(err, GeoError::NoMatch { .. }), "{err}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn service_outage_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client(&server).locate(&torstrasse()).await.unwrap_err();
    assert!(matches!(err, GeoError::UnexpectedStatus { status: 502 }), "{err}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_a_final_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server).locate(&torstrasse()).await.unwrap_err();
    assert!(matches!(err, GeoError::Deserialize { .. }), "{err}");
    assert!(!err.is_transient());
}
