use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{error, info, warn};

/// Keys that must be present for the console to work
pub const REQUIRED_VARS: [&str; 4] = [
    "FIREBASE_API_KEY",
    "FIREBASE_AUTH_DOMAIN",
    "FIREBASE_PROJECT_ID",
    "GOOGLE_MAPS_API_KEY",
];

/// Firebase project identifiers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    pub functions_region: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub firebase: FirebaseConfig,
    pub maps_api_key: Option<String>,
    pub geocode_timeout: Duration,
    /// Stored session to resume
    pub refresh_token: Option<String>,
    /// Google id token from an interactive sign-in
    pub google_id_token: Option<String>,
    missing: Vec<&'static str>,
}

impl Config {
    /// Read configuration from the process environment (and `.env`, if loaded)
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`; missing required keys are logged, not fatal
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| var(*key).is_none())
            .collect();
        for key in &missing {
            error!("Missing required environment variable: {}", key);
        }

        let firebase = FirebaseConfig {
            api_key: var("FIREBASE_API_KEY").unwrap_or_default(),
            auth_domain: var("FIREBASE_AUTH_DOMAIN").unwrap_or_default(),
            project_id: var("FIREBASE_PROJECT_ID").unwrap_or_default(),
            storage_bucket: var("FIREBASE_STORAGE_BUCKET").unwrap_or_default(),
            messaging_sender_id: var("FIREBASE_MESSAGING_SENDER_ID").unwrap_or_default(),
            app_id: var("FIREBASE_APP_ID").unwrap_or_default(),
            functions_region: try_load(&var, "FIREBASE_FUNCTIONS_REGION", "us-central1".to_string()),
        };

        Self {
            firebase,
            maps_api_key: var("GOOGLE_MAPS_API_KEY"),
            geocode_timeout: Duration::from_secs(try_load(&var, "GEOCODE_TIMEOUT_SECS", 5)),
            refresh_token: var("GARAGE_ADMIN_REFRESH_TOKEN"),
            google_id_token: var("GARAGE_ADMIN_GOOGLE_ID_TOKEN"),
            missing,
        }
    }

    /// Required keys that were absent at load time
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Load `.env` from the working directory or its parents.
/// A missing file is fine; an unreadable or malformed one is returned.
pub fn load_env_file() -> Result<Option<PathBuf>, dotenvy::Error> {
    ignore_missing(dotenvy::dotenv())
}

fn ignore_missing<T>(result: Result<T, dotenvy::Error>) -> Result<Option<T>, dotenvy::Error> {
    match result {
        Ok(loaded) => Ok(Some(loaded)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn try_load<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn missing_required_keys_are_reported() {
        let config = config(&[("FIREBASE_API_KEY", "key"), ("FIREBASE_PROJECT_ID", "  ")]);

        assert_eq!(
            config.missing(),
            ["FIREBASE_AUTH_DOMAIN", "FIREBASE_PROJECT_ID", "GOOGLE_MAPS_API_KEY"]
        );
        assert!(!config.is_complete());
        assert_eq!(config.firebase.api_key, "key");
        assert!(config.maps_api_key.is_none());
    }

    #[test]
    fn optional_values_fall_back_to_defaults() {
        let config = config(&[
            ("FIREBASE_API_KEY", "key"),
            ("FIREBASE_AUTH_DOMAIN", "garage.firebaseapp.com"),
            ("FIREBASE_PROJECT_ID", "garage"),
            ("GOOGLE_MAPS_API_KEY", "maps"),
            ("GEOCODE_TIMEOUT_SECS", "soon"),
        ]);

        assert!(config.is_complete());
        assert_eq!(config.firebase.functions_region, "us-central1");
        assert_eq!(config.geocode_timeout, Duration::from_secs(5));
        assert!(config.refresh_token.is_none());
    }

    #[test]
    fn missing_env_file_is_not_an_error() {
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(
            ignore_missing::<()>(Err(dotenvy::Error::Io(missing))),
            Ok(None)
        ));
        assert!(matches!(ignore_missing(Ok(7)), Ok(Some(7))));
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let malformed = ignore_missing::<()>(Err(dotenvy::Error::LineParse("KEY VALUE".into(), 3)));
        assert!(matches!(malformed, Err(dotenvy::Error::LineParse(_, 3))));

        let unreadable = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(ignore_missing::<()>(Err(dotenvy::Error::Io(unreadable))).is_err());
    }

    #[test]
    fn timeout_and_region_are_overridable() {
        let config = config(&[
            ("GEOCODE_TIMEOUT_SECS", "2"),
            ("FIREBASE_FUNCTIONS_REGION", "australia-southeast1"),
        ]);

        assert_eq!(config.geocode_timeout, Duration::from_secs(2));
        assert_eq!(config.firebase.functions_region, "australia-southeast1");
    }
}
