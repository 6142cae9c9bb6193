use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::identity::Session;
use crate::models::{Listing, ListingStatus, User, LISTINGS, USERS};
use crate::store::{Direction, Document, DocumentStore, Fields, Query};

/// Typed reads and writes over the platform's collections
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// All users, ordered by email
    pub async fn list_users(&self) -> Result<Vec<User>, TransportError> {
        let docs = self
            .store
            .query(&Query::collection(USERS).order_by("email", Direction::Ascending))
            .await?;
        debug!("Fetched {} users", docs.len());

        Ok(decode_each(docs, USERS, "uid"))
    }

    /// All listings, newest first
    pub async fn list_listings(&self) -> Result<Vec<Listing>, TransportError> {
        let docs = self
            .store
            .query(&Query::collection(LISTINGS).order_by("dateCreated", Direction::Descending))
            .await?;
        debug!("Fetched {} listings", docs.len());

        Ok(decode_each(docs, LISTINGS, "id"))
    }

    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, TransportError> {
        match self.store.get(USERS, uid).await? {
            Some(doc) => Ok(Some(doc.into_model("uid")?)),
            None => Ok(None),
        }
    }

    pub async fn count_users(&self) -> Result<usize, TransportError> {
        self.count(Query::collection(USERS)).await
    }

    pub async fn count_admins(&self) -> Result<usize, TransportError> {
        self.count(Query::collection(USERS).where_eq("admin", true))
            .await
    }

    pub async fn count_listings(&self) -> Result<usize, TransportError> {
        self.count(Query::collection(LISTINGS)).await
    }

    pub async fn count_active_listings(&self) -> Result<usize, TransportError> {
        self.count(Query::collection(LISTINGS).where_eq("status", ListingStatus::Active.as_str()))
            .await
    }

    async fn count(&self, query: Query) -> Result<usize, TransportError> {
        Ok(self.store.query(&query).await?.len())
    }

    pub async fn delete_listing(&self, id: &str) -> Result<(), TransportError> {
        self.store.delete(LISTINGS, id).await?;
        info!("Deleted listing {}", id);
        Ok(())
    }

    /// Upsert the signed-in operator's user document.
    ///
    /// Profile fields and `lastLogin` are refreshed on every sign-in; `createdAt`,
    /// `admin` and `listings` are only written for a new document. A verified admin
    /// claim is mirrored into the document's `admin` flag.
    pub async fn record_sign_in(&self, session: &Session) -> Result<User, TransportError> {
        let exists = self.store.get(USERS, &session.uid).await?.is_some();
        let now = Utc::now();

        let mut fields = Fields::new();
        fields.insert("uid".into(), json!(session.uid));
        fields.insert("email".into(), json!(session.email));
        fields.insert(
            "displayName".into(),
            json!(session.display_name.as_deref().unwrap_or(&session.email)),
        );
        if let Some(photo_url) = &session.photo_url {
            fields.insert("photoURL".into(), json!(photo_url));
        }
        fields.insert("lastLogin".into(), json!(now));
        if !exists {
            fields.insert("createdAt".into(), json!(now));
            fields.insert("listings".into(), json!([]));
        }
        if session.claims.admin {
            fields.insert("admin".into(), json!(true));
        } else if !exists {
            fields.insert("admin".into(), json!(false));
        }

        self.store.set(USERS, &session.uid, fields, true).await?;
        debug!("Recorded sign-in for {}", session.email);

        self.get_user(&session.uid)
            .await?
            .ok_or_else(|| TransportError::NotFound {
                collection: USERS.to_string(),
                id: session.uid.clone(),
            })
    }
}

/// Decode documents one by one, skipping the ones that don't fit the model
fn decode_each<T: DeserializeOwned>(docs: Vec<Document>, collection: &str, id_field: &str) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match doc.into_model(id_field) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!("Skipping malformed document {}/{}: {}", collection, id, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Claims;
    use crate::store::MemoryStore;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn session(admin: bool) -> Session {
        Session {
            uid: "op1".into(),
            email: "op@example.com".into(),
            display_name: None,
            photo_url: None,
            id_token: "t".into(),
            refresh_token: "r".into(),
            claims: Claims { admin },
        }
    }

    #[tokio::test]
    async fn counts_follow_filters() {
        let store = Arc::new(MemoryStore::new());
        store.insert(USERS, "a", fields(json!({ "email": "a@x", "admin": true })));
        store.insert(USERS, "b", fields(json!({ "email": "b@x", "admin": false })));
        store.insert(LISTINGS, "l1", fields(json!({ "status": "active" })));
        store.insert(LISTINGS, "l2", fields(json!({ "status": "completed" })));
        store.insert(LISTINGS, "l3", fields(json!({ "status": "active" })));
        let repo = Repository::new(store);

        assert_eq!(repo.count_users().await.unwrap(), 2);
        assert_eq!(repo.count_admins().await.unwrap(), 1);
        assert_eq!(repo.count_listings().await.unwrap(), 3);
        assert_eq!(repo.count_active_listings().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn listings_come_back_newest_first_with_ids() {
        let store = Arc::new(MemoryStore::new());
        for (id, created) in [("old", "2024-01-01T00:00:00Z"), ("new", "2024-06-01T00:00:00Z")] {
            store.insert(
                LISTINGS,
                id,
                fields(json!({
                    "authorId": "dummy1",
                    "title": id,
                    "status": "active",
                    "dateCreated": created,
                })),
            );
        }
        let repo = Repository::new(store);

        let listings = repo.list_listings().await.unwrap();
        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
    }

    #[tokio::test]
    async fn malformed_documents_do_not_hide_valid_ones() {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            LISTINGS,
            "good",
            fields(json!({
                "authorId": "dummy1",
                "title": "Books",
                "status": "active",
                "dateCreated": "2024-06-01T00:00:00Z",
            })),
        );
        store.insert(
            LISTINGS,
            "legacy",
            fields(json!({
                "authorId": "dummy2",
                "title": "Old sale",
                "status": "active",
                "dateCreated": "2024-05-01T00:00:00Z",
                "location": { "suburb": "Manly", "state": "NSW" },
            })),
        );
        store.insert(
            USERS,
            "odd",
            fields(json!({ "email": "odd@x", "admin": "yes" })),
        );
        store.insert(USERS, "fine", fields(json!({ "email": "fine@x" })));
        let repo = Repository::new(store);

        let listings = repo.list_listings().await.unwrap();
        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["good"]);

        let users = repo.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].uid, "fine");
    }

    #[tokio::test]
    async fn first_sign_in_creates_user() {
        let repo = Repository::new(Arc::new(MemoryStore::new()));

        let user = repo.record_sign_in(&session(false)).await.unwrap();
        assert_eq!(user.uid, "op1");
        assert_eq!(user.display_name.as_deref(), Some("op@example.com"));
        assert!(!user.admin);
        assert!(user.created_at.is_some());
    }

    #[tokio::test]
    async fn later_sign_in_keeps_history_and_mirrors_claim() {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            USERS,
            "op1",
            fields(json!({
                "uid": "op1",
                "email": "op@example.com",
                "createdAt": "2023-01-01T00:00:00Z",
                "listings": ["l1"],
                "admin": false,
            })),
        );
        let repo = Repository::new(store);

        let user = repo.record_sign_in(&session(true)).await.unwrap();
        assert!(user.admin);
        assert_eq!(user.listings, ["l1"]);
        assert_eq!(
            user.created_at.unwrap().to_rfc3339(),
            "2023-01-01T00:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn delete_listing_removes_document() {
        let store = Arc::new(MemoryStore::new());
        store.insert(LISTINGS, "l1", fields(json!({ "status": "active" })));
        let repo = Repository::new(store.clone());

        repo.delete_listing("l1").await.unwrap();
        assert_eq!(store.count(LISTINGS), 0);
    }
}
