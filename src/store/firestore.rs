use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::identity::TokenSource;
use crate::store::traits::DocumentStore;
use crate::store::types::{Direction, Document, Fields, Query, Write, WriteBatch};
use crate::store::value;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Cloud Firestore backend over the REST API
pub struct FirestoreClient {
    client: Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn TokenSource>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RunQueryEntry {
    document: Option<RawDocument>,
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

impl FirestoreClient {
    pub fn new(project_id: &str, tokens: Arc<dyn TokenSource>) -> Result<Self, TransportError> {
        Self::with_base_url(FIRESTORE_URL, project_id, tokens)
    }

    /// Point the client at another endpoint, e.g. the local emulator
    pub fn with_base_url(
        base_url: &str,
        project_id: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            tokens,
        })
    }

    /// Resource path of the database's document root
    fn root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.root())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.id_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn to_document(&self, raw: RawDocument) -> Result<Document, TransportError> {
        let id = raw
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let fields = match &raw.fields {
            Some(fields) => value::decode_fields(fields)?,
            None => Default::default(),
        };
        Ok(Document::new(id, fields))
    }

    fn encode_write(&self, write: &Write) -> Value {
        match write {
            Write::Set {
                collection,
                id,
                fields,
                merge,
            } => {
                let mut encoded = json!({
                    "update": {
                        "name": self.document_name(collection, id),
                        "fields": value::encode_fields(fields),
                    }
                });
                if *merge {
                    encoded["updateMask"] = json!({ "fieldPaths": merge_paths(fields) });
                }
                encoded
            }
            Write::Update {
                collection,
                id,
                fields,
            } => json!({
                "update": {
                    "name": self.document_name(collection, id),
                    "fields": value::encode_fields(fields),
                },
                "updateMask": { "fieldPaths": field_paths(fields.keys()) },
                "currentDocument": { "exists": true },
            }),
            Write::ArrayUnion {
                collection,
                id,
                field,
                values,
            } => {
                let values: Vec<Value> = values.iter().map(value::encode).collect();
                json!({
                    "update": {
                        "name": self.document_name(collection, id),
                        "fields": {},
                    },
                    "updateMask": { "fieldPaths": [] },
                    "updateTransforms": [{
                        "fieldPath": field_path(field),
                        "appendMissingElements": { "values": values },
                    }],
                    "currentDocument": { "exists": true },
                })
            }
            Write::Delete { collection, id } => json!({
                "delete": self.document_name(collection, id),
            }),
        }
    }

    fn encode_query(&self, query: &Query) -> Value {
        let mut structured = json!({
            "from": [{ "collectionId": query.collection }],
        });

        let filters: Vec<Value> = query
            .filters
            .iter()
            .map(|filter| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": field_path(&filter.field) },
                        "op": "EQUAL",
                        "value": value::encode(&filter.value),
                    }
                })
            })
            .collect();

        match filters.len() {
            0 => {}
            1 => structured["where"] = filters[0].clone(),
            _ => {
                structured["where"] = json!({
                    "compositeFilter": { "op": "AND", "filters": filters }
                })
            }
        }

        if let Some(order) = &query.order_by {
            let direction = match order.direction {
                Direction::Ascending => "ASCENDING",
                Direction::Descending => "DESCENDING",
            };
            structured["orderBy"] = json!([{
                "field": { "fieldPath": field_path(&order.field) },
                "direction": direction,
            }]);
        }

        json!({ "structuredQuery": structured })
    }
}

/// Quote path segments that aren't plain identifiers
fn field_path(path: &str) -> String {
    path.split('.').map(quote_segment).collect::<Vec<_>>().join(".")
}

fn quote_segment(segment: &str) -> String {
    let plain = segment
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        segment.to_string()
    } else {
        format!("`{}`", segment.replace('`', "\\`"))
    }
}

fn field_paths<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<String> {
    keys.map(|key| field_path(key)).collect()
}

/// Leaf paths of `fields`, so a merge touches nested keys instead of replacing whole maps
fn merge_paths(fields: &Fields) -> Vec<String> {
    let mut paths = Vec::new();
    collect_leaf_paths(fields, &mut Vec::new(), &mut paths);
    paths
}

fn collect_leaf_paths(fields: &Fields, prefix: &mut Vec<String>, paths: &mut Vec<String>) {
    for (key, value) in fields {
        prefix.push(quote_segment(key));
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                collect_leaf_paths(nested, prefix, paths)
            }
            _ => paths.push(prefix.join(".")),
        }
        prefix.pop();
    }
}

async fn check(response: Response, endpoint: &str) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|parsed| parsed.error.message)
        .unwrap_or(body);

    warn!("Firestore {} returned {}: {}", endpoint, status, message);
    Err(TransportError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, TransportError> {
        let url = self.url(&self.document_name(collection, id));
        debug!("Fetching document {}/{}", collection, id);

        let response = self.authorized(self.client.get(&url)).await.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let raw: RawDocument = check(response, "get").await?.json().await?;
        Ok(Some(self.to_document(raw)?))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, TransportError> {
        let url = self.url(&format!("{}:runQuery", self.root()));
        debug!("Querying collection {}", query.collection);

        let response = self
            .authorized(self.client.post(&url).json(&self.encode_query(query)))
            .await
            .send()
            .await?;

        let entries: Vec<RunQueryEntry> = check(response, "runQuery").await?.json().await?;
        entries
            .into_iter()
            .filter_map(|entry| entry.document)
            .map(|raw| self.to_document(raw))
            .collect()
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), TransportError> {
        let url = self.url(&self.document_name(collection, id));
        debug!("Deleting document {}/{}", collection, id);

        let response = self.authorized(self.client.delete(&url)).await.send().await?;
        check(response, "delete").await?;
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), TransportError> {
        if batch.is_empty() {
            return Ok(());
        }

        let url = self.url(&format!("{}:commit", self.root()));
        let writes: Vec<Value> = batch
            .writes()
            .iter()
            .map(|write| self.encode_write(write))
            .collect();
        debug!("Committing {} writes", writes.len());

        let response = self
            .authorized(self.client.post(&url).json(&json!({ "writes": writes })))
            .await
            .send()
            .await?;
        check(response, "commit").await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}
