use async_trait::async_trait;

use crate::error::TransportError;
use crate::store::types::{Document, Fields, Query, WriteBatch};

/// Common trait for document database backends.
/// Collections are flat and documents are keyed by string id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document, `None` if it doesn't exist
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, TransportError>;

    /// Run an equality/order-by query over a whole collection
    async fn query(&self, query: &Query) -> Result<Vec<Document>, TransportError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), TransportError>;

    /// Apply every staged write atomically. On error nothing is visible.
    async fn commit(&self, batch: WriteBatch) -> Result<(), TransportError>;

    /// Get the name of the backend
    fn backend_name(&self) -> &'static str;

    /// Fresh document id for a new document
    fn new_id(&self) -> String {
        super::auto_id()
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<(), TransportError> {
        let mut batch = WriteBatch::new();
        if merge {
            batch.set_merge(collection, id, fields);
        } else {
            batch.set(collection, id, fields);
        }
        self.commit(batch).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), TransportError> {
        let mut batch = WriteBatch::new();
        batch.update(collection, id, fields);
        self.commit(batch).await
    }
}
