use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::geocode::google::GoogleGeocoder;
use crate::geocode::traits::{DisabledGeocoder, Geocoder};
use crate::subscription::Subscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
    Failed,
}

/// Loads the maps geocoding client from the configured API key.
///
/// Loading twice is a no-op; `unload` tears the client down again.
pub struct MapsLoader {
    api_key: Option<String>,
    geocoder: Mutex<Option<Arc<GoogleGeocoder>>>,
    state: watch::Sender<LoadState>,
}

impl MapsLoader {
    pub fn new(api_key: Option<String>) -> Self {
        let (state, _) = watch::channel(LoadState::Unloaded);
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            geocoder: Mutex::new(None),
            state,
        }
    }

    pub fn load(&self) -> LoadState {
        let mut geocoder = self.geocoder.lock();
        if geocoder.is_some() {
            debug!("Maps geocoder already loaded");
            return LoadState::Loaded;
        }

        let Some(api_key) = &self.api_key else {
            error!("Google Maps API key is not defined");
            self.state.send_replace(LoadState::Failed);
            return LoadState::Failed;
        };

        let state = match GoogleGeocoder::new(api_key) {
            Ok(loaded) => {
                *geocoder = Some(Arc::new(loaded));
                info!("Google Maps geocoder loaded successfully");
                LoadState::Loaded
            }
            Err(e) => {
                error!("Failed to load Google Maps geocoder: {}", e);
                LoadState::Failed
            }
        };
        self.state.send_replace(state);
        state
    }

    pub fn unload(&self) {
        if self.geocoder.lock().take().is_some() {
            debug!("Maps geocoder unloaded");
        }
        self.state.send_replace(LoadState::Unloaded);
    }

    pub fn state(&self) -> LoadState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> Subscription<LoadState> {
        Subscription::new(self.state.subscribe())
    }

    /// The loaded geocoder, or one that always fails while nothing is loaded
    pub fn geocoder(&self) -> Arc<dyn Geocoder> {
        match self.geocoder.lock().as_ref() {
            Some(loaded) => loaded.clone() as Arc<dyn Geocoder>,
            None => Arc::new(DisabledGeocoder) as Arc<dyn Geocoder>,
        }
    }
}

impl Drop for MapsLoader {
    fn drop(&mut self) {
        self.unload();
    }
}
