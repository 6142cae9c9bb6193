use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GeocodeError, TransportError};
use crate::geocode::traits::{GeocodeResult, Geocoder};
use crate::models::Coordinates;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Google Maps Geocoding API client
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(api_key: &str) -> Result<Self, TransportError> {
        Self::with_endpoint(api_key, GEOCODE_URL)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}

fn into_results(response: GeocodeResponse) -> Result<Vec<GeocodeResult>, GeocodeError> {
    match response.status.as_str() {
        "OK" => Ok(response.results),
        "ZERO_RESULTS" => Ok(Vec::new()),
        status => {
            let detail = response.error_message.unwrap_or_default();
            Err(GeocodeError::Provider(format!("{status} {detail}").trim().to_string()))
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let latlng = format!("{},{}", coordinates.latitude, coordinates.longitude);
        debug!("Reverse geocoding {}", latlng);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("latlng", latlng.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(TransportError::from)?;

        if !response.status().is_success() {
            warn!("Geocoding returned status: {}", response.status());
            return Err(TransportError::Status {
                endpoint: "geocode".to_string(),
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            }
            .into());
        }

        let body: GeocodeResponse = response.json().await.map_err(TransportError::from)?;
        into_results(body)
    }

    fn provider_name(&self) -> &'static str {
        "Google Maps"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        into_results(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn ok_response_yields_components() {
        let results = parse(
            r#"{
                "status": "OK",
                "results": [{
                    "formatted_address": "12 Spit Rd, Mosman NSW 2088, Australia",
                    "address_components": [
                        { "long_name": "12", "short_name": "12", "types": ["street_number"] },
                        { "long_name": "Spit Road", "short_name": "Spit Rd", "types": ["route"] },
                        { "long_name": "Mosman", "short_name": "Mosman", "types": ["locality", "political"] }
                    ]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].component("route"), Some("Spit Road"));
        assert_eq!(results[0].component("locality"), Some("Mosman"));
        assert_eq!(results[0].component("postal_code"), None);
    }

    #[test]
    fn zero_results_is_empty_not_error() {
        assert!(parse(r#"{ "status": "ZERO_RESULTS", "results": [] }"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn denied_request_is_provider_error() {
        let err = parse(r#"{ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }"#)
            .unwrap_err();
        assert!(matches!(err, GeocodeError::Provider(msg) if msg.starts_with("REQUEST_DENIED")));
    }
}
