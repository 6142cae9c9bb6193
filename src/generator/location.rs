use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::GeocodeError;
use crate::generator::pools::{Region, STREET_STEMS, SYDNEY_BOUNDS, SYDNEY_REGIONS};
use crate::generator::sampling::random_coordinate;
use crate::geocode::{GeocodeResult, Geocoder};
use crate::models::{Coordinates, Location};

/// Random draws for one location, taken up front so no RNG is held across the lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationDraft {
    pub coordinates: Coordinates,
    pub region: Region,
    pub house_number: u32,
    pub street_stem: &'static str,
}

impl LocationDraft {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            coordinates: random_coordinate(&SYDNEY_BOUNDS, rng),
            region: *SYDNEY_REGIONS
                .choose(rng)
                .unwrap_or(&SYDNEY_REGIONS[0]),
            house_number: rng.gen_range(1..=200),
            street_stem: STREET_STEMS.choose(rng).copied().unwrap_or(STREET_STEMS[0]),
        }
    }

    /// Synthesized address in the drafted region
    pub fn fallback(&self) -> Location {
        Location {
            address: format!("{} {} Street", self.house_number, self.street_stem),
            suburb: self.region.name.to_string(),
            state: self.region.state.to_string(),
            postcode: self.region.postcode.to_string(),
            coordinates: self.coordinates,
        }
    }

    /// Real street address from a geocoding result, if it has one
    fn from_result(&self, result: &GeocodeResult) -> Option<Location> {
        let number = result.component("street_number").unwrap_or_default();
        let street = result.component("route").unwrap_or_default();
        let address = format!("{number} {street}").trim().to_string();
        if address.is_empty() {
            return None;
        }

        Some(Location {
            address,
            suburb: result
                .component("locality")
                .unwrap_or(self.region.name)
                .to_string(),
            state: self.region.state.to_string(),
            postcode: self.region.postcode.to_string(),
            coordinates: self.coordinates,
        })
    }
}

/// Turns drafted coordinates into addresses through a geocoder.
/// Lookup failures and timeouts fall back to the drafted synthetic address.
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, timeout: Duration) -> Self {
        Self { geocoder, timeout }
    }

    pub async fn resolve(&self, draft: &LocationDraft) -> Location {
        let lookup = tokio::time::timeout(self.timeout, self.geocoder.reverse(draft.coordinates));
        let outcome = match lookup.await {
            Ok(result) => result,
            Err(_) => Err(GeocodeError::Timeout),
        };

        match outcome {
            Ok(results) => match results.first().and_then(|first| draft.from_result(first)) {
                Some(location) => {
                    debug!("Geocoded {:?} to {}", draft.coordinates, location.address);
                    location
                }
                None => {
                    debug!("No street address for {:?}, using fallback", draft.coordinates);
                    draft.fallback()
                }
            },
            Err(e) => {
                warn!(
                    "Error generating location via {}: {}",
                    self.geocoder.provider_name(),
                    e
                );
                draft.fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::{AddressComponent, DisabledGeocoder};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixed(Vec<GeocodeResult>);

    #[async_trait]
    impl Geocoder for Fixed {
        async fn reverse(&self, _c: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError> {
            Ok(self.0.clone())
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn component(name: &str, kind: &str) -> AddressComponent {
        AddressComponent {
            long_name: name.into(),
            short_name: name.into(),
            types: vec![kind.into()],
        }
    }

    fn draft() -> LocationDraft {
        LocationDraft::random(&mut StdRng::seed_from_u64(3))
    }

    #[tokio::test]
    async fn uses_geocoded_street_and_locality() {
        let result = GeocodeResult {
            formatted_address: String::new(),
            address_components: vec![
                component("5", "street_number"),
                component("Beach Road", "route"),
                component("Bondi", "locality"),
            ],
        };
        let resolver = LocationResolver::new(Arc::new(Fixed(vec![result])), Duration::from_secs(1));
        let draft = draft();

        let location = resolver.resolve(&draft).await;
        assert_eq!(location.address, "5 Beach Road");
        assert_eq!(location.suburb, "Bondi");
        assert_eq!(location.postcode, draft.region.postcode);
        assert_eq!(location.coordinates, draft.coordinates);
    }

    #[tokio::test]
    async fn missing_locality_uses_region_name() {
        let result = GeocodeResult {
            formatted_address: String::new(),
            address_components: vec![component("Old Northern Road", "route")],
        };
        let resolver = LocationResolver::new(Arc::new(Fixed(vec![result])), Duration::from_secs(1));
        let draft = draft();

        let location = resolver.resolve(&draft).await;
        assert_eq!(location.address, "Old Northern Road");
        assert_eq!(location.suburb, draft.region.name);
    }

    #[tokio::test]
    async fn empty_or_failed_lookups_fall_back() {
        let draft = draft();

        let empty = LocationResolver::new(Arc::new(Fixed(Vec::new())), Duration::from_secs(1));
        assert_eq!(empty.resolve(&draft).await, draft.fallback());

        let streetless = GeocodeResult {
            formatted_address: "Sydney NSW".into(),
            address_components: vec![component("Sydney", "locality")],
        };
        let streetless = LocationResolver::new(Arc::new(Fixed(vec![streetless])), Duration::from_secs(1));
        assert_eq!(streetless.resolve(&draft).await, draft.fallback());

        let disabled = LocationResolver::new(Arc::new(DisabledGeocoder), Duration::from_secs(1));
        let location = disabled.resolve(&draft).await;
        assert!(location.address.ends_with(" Street"));
        assert_eq!(location.state, "NSW");
    }
}
