pub mod google;
pub mod loader;
pub mod traits;

pub use google::GoogleGeocoder;
pub use loader::{LoadState, MapsLoader};
pub use traits::{AddressComponent, DisabledGeocoder, GeocodeResult, Geocoder};
