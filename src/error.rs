use thiserror::Error;

/// A remote call (store, function, identity or geocoding endpoint) failed
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("{collection}/{id} doesn't exist")]
    NotFound { collection: String, id: String },

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("function {name} failed ({status}): {message}")]
    Function {
        name: String,
        status: String,
        message: String,
    },
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::Decode(e.to_string())
    }
}

/// The operator is not signed in or lacks privilege
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("You must be logged in to perform this action")]
    NotSignedIn,

    #[error("You must have admin privileges to perform this action")]
    NotAdmin,

    #[error("a user id is required")]
    InvalidUid,

    /// The identity provider refused the credential
    #[error("sign-in rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Reverse geocoding failed. Always recovered by the caller.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("geocoding provider error: {0}")]
    Provider(String),

    #[error("geocoding timed out")]
    Timeout,

    #[error("geocoder is not loaded")]
    NotLoaded,
}

/// Dummy listing generation failed; nothing was written
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("count must be at least 1")]
    InvalidCount,

    #[error("failed to generate dummy listings: {0}")]
    Auth(#[source] AuthError),

    #[error("failed to generate dummy listings: {0}")]
    Store(#[source] TransportError),
}

impl From<AuthError> for GenerationError {
    fn from(e: AuthError) -> Self {
        GenerationError::Auth(e)
    }
}

impl From<TransportError> for GenerationError {
    fn from(e: TransportError) -> Self {
        GenerationError::Store(e)
    }
}
