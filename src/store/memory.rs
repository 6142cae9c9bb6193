use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::store::traits::DocumentStore;
use crate::store::types::{Direction, Document, Fields, Query, Write, WriteBatch};

type Collection = BTreeMap<String, Fields>;
type Collections = HashMap<String, Collection>;

/// In-process document store with the same batch semantics as Firestore.
/// Used for dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    commit_failure: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document in place without going through a batch
    pub fn insert(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Make every following commit fail with `reason` until cleared
    pub fn fail_commits(&self, reason: impl Into<String>) {
        *self.commit_failure.lock() = Some(reason.into());
    }

    pub fn clear_failure(&self) {
        *self.commit_failure.lock() = None;
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Copy of every document in a collection, ordered by id
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, TransportError> {
        Ok(self
            .collections
            .lock()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, TransportError> {
        let mut docs: Vec<Document> = self
            .documents(&query.collection)
            .into_iter()
            .filter(|doc| {
                query
                    .filters
                    .iter()
                    .all(|filter| field(&doc.fields, &filter.field) == Some(&filter.value))
            })
            .collect();

        if let Some(order) = &query.order_by {
            // Documents without the ordering field are left out, as Firestore does
            docs.retain(|doc| field(&doc.fields, &order.field).is_some());
            docs.sort_by(|a, b| {
                let ord = compare(
                    field(&a.fields, &order.field).unwrap_or(&Value::Null),
                    field(&b.fields, &order.field).unwrap_or(&Value::Null),
                );
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        Ok(docs)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), TransportError> {
        if let Some(docs) = self.collections.lock().get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), TransportError> {
        if let Some(reason) = self.commit_failure.lock().clone() {
            return Err(TransportError::Unavailable(reason));
        }

        let mut collections = self.collections.lock();

        // Apply to a copy so a failing write leaves the store untouched
        let mut staged = collections.clone();
        for write in batch.writes() {
            apply(&mut staged, write)?;
        }

        debug!("Committed {} writes to memory store", batch.len());
        *collections = staged;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

fn apply(collections: &mut Collections, write: &Write) -> Result<(), TransportError> {
    match write {
        Write::Set {
            collection,
            id,
            fields,
            merge,
        } => {
            let docs = collections.entry(collection.clone()).or_default();
            if *merge {
                let doc = docs.entry(id.clone()).or_default();
                merge_fields(doc, fields);
            } else {
                docs.insert(id.clone(), fields.clone());
            }
        }
        Write::Update {
            collection,
            id,
            fields,
        } => {
            let doc = existing(collections, collection, id)?;
            for (key, value) in fields {
                doc.insert(key.clone(), value.clone());
            }
        }
        Write::ArrayUnion {
            collection,
            id,
            field,
            values,
        } => {
            let doc = existing(collections, collection, id)?;
            let entry = doc
                .entry(field.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !entry.is_array() {
                *entry = Value::Array(Vec::new());
            }
            if let Value::Array(items) = entry {
                for value in values {
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                }
            }
        }
        Write::Delete { collection, id } => {
            if let Some(docs) = collections.get_mut(collection) {
                docs.remove(id);
            }
        }
    }
    Ok(())
}

fn existing<'a>(
    collections: &'a mut Collections,
    collection: &str,
    id: &str,
) -> Result<&'a mut Fields, TransportError> {
    collections
        .get_mut(collection)
        .and_then(|docs| docs.get_mut(id))
        .ok_or_else(|| TransportError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })
}

fn merge_fields(target: &mut Fields, source: &Fields) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            // An empty map is a leaf, as in a Firestore merge mask
            (Some(Value::Object(existing)), Value::Object(incoming)) if !incoming.is_empty() => {
                merge_fields(existing, incoming)
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Resolve a dotted field path
fn field<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = fields.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => a
            .iter()
            .zip(b.iter())
            .map(|(a, b)| compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
