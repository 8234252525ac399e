//! Document store shared by every route.
//!
//! Routes only speak to [`DocumentStore`]. Two backends exist: MongoDB for
//! deployments and an in-memory store for tests and local runs.
mod memory;
mod mongo;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRef;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::AppState;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

pub const DEFAULT_DATABASE_NAME: &str = "talesFromBanglaDB";
pub const DEFAULT_HOST: &str = "cluster0.hxgse1v.mongodb.net";
/// Field holding the identifier of every document.
pub const ID_FIELD: &str = "_id";

pub type Result<T> = std::result::Result<T, StoreError>;

/// A stored or to-be-stored JSON object.
pub type Document = Map<String, Value>;

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("mongodb request failed: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("cannot convert document to BSON: {0}")]
    Serialize(#[from] mongodb::bson::ser::Error),
    #[error("cannot convert BSON to document: {0}")]
    Deserialize(String),
}

/// Collections known by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Bookings,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Bookings => "bookings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Selection of documents inside a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    /// Documents where `field` is a string equal to `value`.
    Eq { field: &'static str, value: String },
}

impl Filter {
    /// Select by equality when a value is given, otherwise everything.
    pub fn eq_or_all(field: &'static str, value: Option<String>) -> Self {
        match value {
            Some(value) => Filter::Eq { field, value },
            None => Filter::All,
        }
    }

    fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => {
                document.get(*field).and_then(Value::as_str) == Some(value.as_str())
            },
        }
    }
}

/// Store-assigned identifier of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parse a 24-character hexadecimal identifier.
    pub fn parse(id: &str) -> Option<Self> {
        ObjectId::parse_str(id).ok().map(Self)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for DocumentId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for DocumentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

/// Outcome of an insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

/// Outcome of an update with upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<DocumentId>,
}

/// Outcome of a deletion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Operations the routes need from a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of `collection` selected by `filter`.
    async fn find(&self, collection: Collection, filter: Filter) -> Result<Vec<Document>>;

    /// Document with the given identifier, if any.
    async fn find_one(&self, collection: Collection, id: DocumentId) -> Result<Option<Document>>;

    /// Store `document` as-is and return its new identifier.
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOneResult>;

    /// Set `fields` on the document with the given identifier, creating it
    /// when absent.
    async fn upsert_fields(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Document,
    ) -> Result<UpdateResult>;

    /// Remove the document with the given identifier.
    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult>;

    /// Check that the backend answers.
    async fn ping(&self) -> Result<()>;

    /// Release connections. Called once on shutdown.
    async fn close(&self);
}

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub store: Arc<dyn DocumentStore>,
}

impl Database {
    /// Connect to MongoDB.
    pub async fn mongo(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
    ) -> Result<Self> {
        let store = MongoStore::connect(hostname, username, password, db).await?;
        store.ping().await?;

        tracing::info!(%hostname, %db, "mongodb connected");

        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Volatile store kept in process memory.
    pub fn memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
        }
    }
}

impl std::ops::Deref for Database {
    type Target = dyn DocumentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id() {
        let id = DocumentId::generate();
        assert_eq!(DocumentId::parse(&id.to_string()), Some(id));
        assert_eq!(json!(id), json!(id.to_string()));

        assert_eq!(DocumentId::parse("not-an-id"), None);
        assert_eq!(DocumentId::parse("65f0c2"), None);
    }

    #[test]
    fn test_filter() {
        let document = json!({ "userEmail": "a@example.com", "count": 1 });
        let document = document.as_object().unwrap();

        assert!(Filter::All.matches(document));
        assert!(Filter::eq_or_all("userEmail", Some("a@example.com".into())).matches(document));
        assert!(!Filter::eq_or_all("userEmail", Some("b@example.com".into())).matches(document));
        assert!(!Filter::eq_or_all("missing", Some("a@example.com".into())).matches(document));
        assert_eq!(Filter::eq_or_all("userEmail", None), Filter::All);
    }

    #[test]
    fn test_result_shapes() {
        let id = DocumentId::generate();
        let update = UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        };

        assert_eq!(
            json!(update),
            json!({
                "acknowledged": true,
                "matchedCount": 0,
                "modifiedCount": 0,
                "upsertedCount": 1,
                "upsertedId": id.to_string(),
            })
        );
        assert_eq!(
            json!(DeleteResult { acknowledged: true, deleted_count: 1 }),
            json!({ "acknowledged": true, "deletedCount": 1 })
        );
    }
}
