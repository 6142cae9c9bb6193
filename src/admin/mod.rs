pub mod functions;

pub use functions::{CallableFunctions, HttpsCallable};

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::error::AuthError;
use crate::identity::IdentityGate;

/// Name of the remote function that grants the admin claim
pub const SET_ADMIN_ROLE: &str = "setAdminRole";

/// Checks and elevates admin privilege.
///
/// Elevation is only ever requested through [`SET_ADMIN_ROLE`], which does its own
/// authorization server-side; the client has no way to grant itself the claim.
pub struct AdminService {
    gate: Arc<IdentityGate>,
    functions: Arc<dyn CallableFunctions>,
}

impl AdminService {
    pub fn new(gate: Arc<IdentityGate>, functions: Arc<dyn CallableFunctions>) -> Self {
        Self { gate, functions }
    }

    /// Whether the refreshed token of the current session carries the admin claim
    pub async fn check_is_admin(&self) -> Result<bool, AuthError> {
        if self.gate.current_user().is_none() {
            return Ok(false);
        }
        let session = self.gate.force_refresh().await?;
        Ok(session.claims.admin)
    }

    pub async fn make_user_admin(&self, uid: &str) -> Result<(), AuthError> {
        if self.gate.current_user().is_none() {
            return Err(AuthError::NotSignedIn);
        }
        if uid.trim().is_empty() {
            return Err(AuthError::InvalidUid);
        }

        self.functions
            .call(SET_ADMIN_ROLE, json!({ "uid": uid }))
            .await?;
        info!("Requested admin role for {}", uid);
        Ok(())
    }
}
