#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use garage_admin::admin::CallableFunctions;
use garage_admin::error::{AuthError, GeocodeError, TransportError};
use garage_admin::geocode::{AddressComponent, GeocodeResult, Geocoder};
use garage_admin::identity::{Claims, Credential, IdentityProvider, Session};
use garage_admin::models::{Coordinates, USERS};
use garage_admin::store::{Fields, MemoryStore};

pub fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap_or_default()
}

pub fn session(uid: &str, admin: bool) -> Session {
    Session {
        uid: uid.into(),
        email: format!("{uid}@example.com"),
        display_name: None,
        photo_url: None,
        id_token: "token".into(),
        refresh_token: "refresh".into(),
        claims: Claims { admin },
    }
}

/// Store holding one operator user document
pub fn store_with_operator(uid: &str, admin: bool) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        USERS,
        uid,
        fields(json!({ "uid": uid, "email": format!("{uid}@example.com"), "admin": admin })),
    );
    store
}

/// Always answers with the same street address
pub struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn reverse(&self, _coordinates: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let component = |name: &str, kind: &str| AddressComponent {
            long_name: name.into(),
            short_name: name.into(),
            types: vec![kind.into()],
        };
        Ok(vec![GeocodeResult {
            formatted_address: "12 George St, Sydney NSW 2000".into(),
            address_components: vec![
                component("12", "street_number"),
                component("George St", "route"),
                component("Sydney", "locality"),
            ],
        }])
    }

    fn provider_name(&self) -> &'static str {
        "fixed"
    }
}

/// Finds nothing anywhere
pub struct EmptyGeocoder;

#[async_trait]
impl Geocoder for EmptyGeocoder {
    async fn reverse(&self, _coordinates: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError> {
        Ok(Vec::new())
    }

    fn provider_name(&self) -> &'static str {
        "empty"
    }
}

/// Never answers in time
pub struct SlowGeocoder;

#[async_trait]
impl Geocoder for SlowGeocoder {
    async fn reverse(&self, _coordinates: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }

    fn provider_name(&self) -> &'static str {
        "slow"
    }
}

/// Admin claims per uid, shared by the fake provider and the fake backend
#[derive(Default)]
pub struct ClaimsBackend {
    admins: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl ClaimsBackend {
    pub fn is_admin(&self, uid: &str) -> bool {
        self.admins.lock().iter().any(|admin| admin == uid)
    }
}

/// Signs everyone in as `uid`, with claims read from the backend
pub struct FakeIdentity {
    pub uid: String,
    pub backend: Arc<ClaimsBackend>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, _credential: &Credential) -> Result<Session, AuthError> {
        Ok(session(&self.uid, self.backend.is_admin(&self.uid)))
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let mut refreshed = session.clone();
        refreshed.claims.admin = self.backend.is_admin(&session.uid);
        Ok(refreshed)
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// `setAdminRole` that grants the claim to the given uid
pub struct FakeFunctions {
    pub backend: Arc<ClaimsBackend>,
}

#[async_trait]
impl CallableFunctions for FakeFunctions {
    async fn call(&self, name: &str, data: Value) -> Result<Value, TransportError> {
        self.backend.calls.lock().push((name.to_string(), data.clone()));

        let uid = data["uid"].as_str().unwrap_or_default().to_string();
        self.backend.admins.lock().push(uid.clone());
        Ok(json!({ "message": format!("Success! {uid} has been made an admin.") }))
    }
}
