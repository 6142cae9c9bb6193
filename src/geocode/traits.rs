use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GeocodeError;
use crate::models::Coordinates;

/// One structured part of a geocoded address
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// A candidate address for a coordinate
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

impl GeocodeResult {
    /// Long name of the first component of the given type (`route`, `locality`, ...)
    pub fn component(&self, kind: &str) -> Option<&str> {
        self.address_components
            .iter()
            .find(|component| component.types.iter().any(|t| t == kind))
            .map(|component| component.long_name.as_str())
    }
}

/// Common trait for reverse geocoding providers
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidate addresses for a coordinate, best match first. May be empty.
    async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError>;

    /// Get the name of the provider
    fn provider_name(&self) -> &'static str;
}

/// Stand-in used while no provider is loaded; every lookup fails
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn reverse(&self, _coordinates: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError> {
        Err(GeocodeError::NotLoaded)
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}
