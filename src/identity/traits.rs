use std::fmt;

use async_trait::async_trait;

use crate::error::AuthError;

/// What the operator signs in with
#[derive(Clone)]
pub enum Credential {
    /// Google id token obtained from an interactive sign-in
    GoogleIdToken(String),
    /// Refresh token of an earlier session
    RefreshToken(String),
}

/// Custom claims carried by the id token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    pub admin: bool,
}

/// A signed-in operator
#[derive(Clone, PartialEq)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub claims: Claims,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

/// Common trait for identity providers
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a credential for a session
    async fn sign_in(&self, credential: &Credential) -> Result<Session, AuthError>;

    /// Force a fresh id token for `session` and re-read its claims
    async fn refresh(&self, session: &Session) -> Result<Session, AuthError>;

    /// Get the name of the provider
    fn provider_name(&self) -> &'static str;
}

/// Supplies the bearer token attached to backend requests
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn id_token(&self) -> Option<String>;
}
