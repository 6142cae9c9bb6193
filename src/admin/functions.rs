use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::identity::TokenSource;

/// Remote privileged functions callable by a signed-in client
#[async_trait]
pub trait CallableFunctions: Send + Sync {
    async fn call(&self, name: &str, data: Value) -> Result<Value, TransportError>;
}

/// Cloud Functions reached through the HTTPS callable protocol
pub struct HttpsCallable {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

#[derive(Debug, Deserialize)]
struct CallableResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<CallableError>,
}

#[derive(Debug, Deserialize)]
struct CallableError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl HttpsCallable {
    pub fn new(
        region: &str,
        project_id: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, TransportError> {
        let base_url = format!("https://{region}-{project_id}.cloudfunctions.net");
        Self::with_base_url(&base_url, tokens)
    }

    pub fn with_base_url(base_url: &str, tokens: Arc<dyn TokenSource>) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }
}

fn into_result(name: &str, status: u16, body: &str) -> Result<Value, TransportError> {
    let parsed: Option<CallableResponse> = serde_json::from_str(body).ok();

    match parsed {
        Some(CallableResponse {
            error: Some(error), ..
        }) => Err(TransportError::Function {
            name: name.to_string(),
            status: error.status,
            message: error.message,
        }),
        Some(response) if (200..300).contains(&status) => {
            Ok(response.result.unwrap_or(Value::Null))
        }
        _ if (200..300).contains(&status) => Err(TransportError::Decode(format!(
            "{name} returned a body without a result"
        ))),
        _ => Err(TransportError::Status {
            endpoint: name.to_string(),
            status,
            message: body.to_string(),
        }),
    }
}

#[async_trait]
impl CallableFunctions for HttpsCallable {
    async fn call(&self, name: &str, data: Value) -> Result<Value, TransportError> {
        let url = format!("{}/{name}", self.base_url);
        debug!("Calling function {}", name);

        let mut request = self.client.post(&url).json(&json!({ "data": data }));
        if let Some(token) = self.tokens.id_token().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        into_result(name, status, &body).map_err(|e| {
            warn!("Function {} failed: {}", name, e);
            e
        })
    }
}
