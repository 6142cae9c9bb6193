use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{error, info};

use crate::error::AuthError;
use crate::identity::traits::{Claims, Credential, IdentityProvider, Session, TokenSource};
use crate::subscription::Subscription;

/// Admin privilege of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminStatus {
    /// Still being determined
    Unknown,
    Admin,
    NotAdmin,
}

impl AdminStatus {
    pub fn from_claims(claims: &Claims) -> Self {
        if claims.admin {
            AdminStatus::Admin
        } else {
            AdminStatus::NotAdmin
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AdminStatus::Admin)
    }
}

/// Snapshot published to subscribers on every change
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<Session>,
    pub admin: AdminStatus,
}

/// Owns the operator session and derives its admin status.
///
/// Admin status is never cached from a client flag: every session change resets
/// it to [`AdminStatus::Unknown`] and recomputes it from a freshly issued token.
pub struct IdentityGate {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<AuthState>,
}

impl IdentityGate {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(AuthState {
            user: None,
            admin: AdminStatus::Unknown,
        });
        Self { provider, state }
    }

    pub fn subscribe(&self) -> Subscription<AuthState> {
        Subscription::new(self.state.subscribe())
    }

    pub fn current_user(&self) -> Option<Session> {
        self.state.borrow().user.clone()
    }

    pub fn admin_status(&self) -> AdminStatus {
        self.state.borrow().admin
    }

    pub async fn sign_in(&self, credential: &Credential) -> Result<Session, AuthError> {
        let session = self.provider.sign_in(credential).await?;
        info!(
            "Signed in as {} via {}",
            session.email,
            self.provider.provider_name()
        );

        self.state.send_replace(AuthState {
            user: Some(session.clone()),
            admin: AdminStatus::Unknown,
        });
        self.refresh_admin_status().await;

        Ok(self.current_user().unwrap_or(session))
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.current_user() {
            info!("Signed out {}", user.email);
        }
        self.state.send_replace(AuthState {
            user: None,
            admin: AdminStatus::NotAdmin,
        });
    }

    /// Force a fresh id token for the current session
    pub async fn force_refresh(&self) -> Result<Session, AuthError> {
        let current = self.current_user().ok_or(AuthError::NotSignedIn)?;
        let fresh = self.provider.refresh(&current).await?;

        self.state.send_if_modified(|state| match &state.user {
            // The session may have changed while the refresh was in flight
            Some(user) if user.uid == fresh.uid => {
                state.user = Some(fresh.clone());
                true
            }
            _ => false,
        });

        Ok(fresh)
    }

    /// Recompute the admin status from the refreshed token's claims
    pub async fn refresh_admin_status(&self) -> AdminStatus {
        if self.current_user().is_none() {
            self.publish_admin(AdminStatus::NotAdmin);
            return AdminStatus::NotAdmin;
        }

        let status = match self.force_refresh().await {
            Ok(session) => AdminStatus::from_claims(&session.claims),
            Err(e) => {
                error!("Error checking admin status: {}", e);
                AdminStatus::NotAdmin
            }
        };

        info!("Admin status: {:?}", status);
        self.publish_admin(status);
        status
    }

    fn publish_admin(&self, admin: AdminStatus) {
        self.state.send_if_modified(|state| {
            let changed = state.admin != admin;
            state.admin = admin;
            changed
        });
    }
}

#[async_trait]
impl TokenSource for IdentityGate {
    async fn id_token(&self) -> Option<String> {
        self.current_user().map(|session| session.id_token)
    }
}
