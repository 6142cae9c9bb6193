use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AuthError, TransportError};
use crate::identity::traits::{Claims, Credential, IdentityProvider, Session};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Firebase Authentication over the Identity Toolkit REST API
pub struct FirebaseIdentity {
    client: Client,
    api_key: String,
    identity_url: String,
    token_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: String,
    display_name: Option<String>,
    photo_url: Option<String>,
    /// JSON-encoded custom claims
    custom_attributes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

impl FirebaseIdentity {
    pub fn new(api_key: &str) -> Result<Self, TransportError> {
        Self::with_endpoints(api_key, IDENTITY_TOOLKIT_URL, SECURE_TOKEN_URL)
    }

    /// Use other endpoints, e.g. the auth emulator
    pub fn with_endpoints(
        api_key: &str,
        identity_url: &str,
        token_url: &str,
    ) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            identity_url: identity_url.trim_end_matches('/').to_string(),
            token_url: token_url.trim_end_matches('/').to_string(),
        })
    }

    async fn sign_in_with_google(&self, google_id_token: &str) -> Result<(String, String), AuthError> {
        let url = format!("{}/accounts:signInWithIdp", self.identity_url);
        let body = SignInWithIdpRequest {
            post_body: format!("id_token={google_id_token}&providerId=google.com"),
            request_uri: "http://localhost",
            return_idp_credential: true,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(TransportError::from)?;

        let signed_in: SignInWithIdpResponse = check(response, "signInWithIdp")
            .await?
            .json()
            .await
            .map_err(TransportError::from)?;
        Ok((signed_in.id_token, signed_in.refresh_token))
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<(String, String), AuthError> {
        let url = format!("{}/token", self.token_url);
        debug!("Exchanging refresh token for a fresh id token");

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(TransportError::from)?;

        let tokens: TokenResponse = check(response, "token")
            .await?
            .json()
            .await
            .map_err(TransportError::from)?;
        Ok((tokens.id_token, tokens.refresh_token))
    }

    /// Build the session for a token pair, reading profile and custom claims
    async fn lookup(&self, id_token: String, refresh_token: String) -> Result<Session, AuthError> {
        let url = format!("{}/accounts:lookup", self.identity_url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&serde_json::json!({ "idToken": id_token }))
            .send()
            .await
            .map_err(TransportError::from)?;

        let lookup: LookupResponse = check(response, "lookup")
            .await?
            .json()
            .await
            .map_err(TransportError::from)?;
        let account = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Rejected("USER_NOT_FOUND".to_string()))?;

        Ok(Session {
            claims: parse_claims(account.custom_attributes.as_deref()),
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name,
            photo_url: account.photo_url,
            id_token,
            refresh_token,
        })
    }
}

fn parse_claims(custom_attributes: Option<&str>) -> Claims {
    let Some(raw) = custom_attributes.filter(|raw| !raw.is_empty()) else {
        return Claims::default();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(claims) => Claims {
            admin: claims.get("admin").and_then(Value::as_bool).unwrap_or(false),
        },
        Err(e) => {
            warn!("Ignoring unreadable custom claims: {}", e);
            Claims::default()
        }
    }
}

/// Client errors from the identity endpoints mean the credential was refused
async fn check(response: Response, endpoint: &str) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|parsed| parsed.error.message)
        .unwrap_or(body);

    if status.is_client_error() {
        warn!("{} rejected the credential: {}", endpoint, message);
        return Err(AuthError::Rejected(message));
    }

    Err(TransportError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    }
    .into())
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self, credential: &Credential) -> Result<Session, AuthError> {
        let (id_token, refresh_token) = match credential {
            Credential::GoogleIdToken(token) => self.sign_in_with_google(token).await?,
            Credential::RefreshToken(token) => self.exchange_refresh_token(token).await?,
        };
        self.lookup(id_token, refresh_token).await
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let (id_token, refresh_token) = self.exchange_refresh_token(&session.refresh_token).await?;
        self.lookup(id_token, refresh_token).await
    }

    fn provider_name(&self) -> &'static str {
        "Firebase Auth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_claim_is_read_from_custom_attributes() {
        assert!(parse_claims(Some(r#"{"admin":true}"#)).admin);
        assert!(!parse_claims(Some(r#"{"admin":"yes"}"#)).admin);
        assert!(!parse_claims(Some("")).admin);
        assert!(!parse_claims(Some("not json")).admin);
        assert!(!parse_claims(None).admin);
    }

    #[test]
    fn lookup_response_decodes_sparse_accounts() {
        let lookup: LookupResponse = serde_json::from_str(
            r#"{"users":[{"localId":"abc","email":"op@example.com","customAttributes":"{\"admin\":true}"}]}"#,
        )
        .unwrap();

        let account = &lookup.users[0];
        assert_eq!(account.local_id, "abc");
        assert!(account.display_name.is_none());
        assert!(parse_claims(account.custom_attributes.as_deref()).admin);
    }
}
