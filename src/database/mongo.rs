//! MongoDB backend built on the official driver.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, Document as BsonDocument, doc};
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Database};
use serde_json::Value;

use super::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, ID_FIELD,
    InsertOneResult, Result, StoreError, UpdateResult,
};

/// Build the connection string of an Atlas cluster.
pub(crate) fn connection_uri(hostname: &str, username: &str, password: &str) -> String {
    format!("mongodb+srv://{username}:{password}@{hostname}/?retryWrites=true&w=majority")
}

/// One long-lived client shared by every request.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Create the client with Stable API v1.
    pub async fn connect(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
    ) -> Result<Self> {
        let mut options = ClientOptions::parse(connection_uri(hostname, username, password)).await?;
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(options)?;
        let database = client.database(db);

        Ok(Self { client, database })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<BsonDocument> {
        self.database.collection(collection.name())
    }
}

fn by_id(id: DocumentId) -> BsonDocument {
    doc! { ID_FIELD: id.object_id() }
}

fn to_bson(filter: Filter) -> BsonDocument {
    match filter {
        Filter::All => BsonDocument::new(),
        Filter::Eq { field, value } => {
            let mut filter = BsonDocument::new();
            filter.insert(field, value);
            filter
        },
    }
}

/// Convert a stored document to JSON, exposing `_id` as its hex string.
fn to_json(mut document: BsonDocument) -> Result<Document> {
    if let Ok(id) = document.get_object_id(ID_FIELD) {
        document.insert(ID_FIELD, id.to_hex());
    }

    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(document) => Ok(document),
        other => Err(StoreError::Deserialize(format!("expected an object, got {other}"))),
    }
}

fn to_document_id(id: Bson) -> Result<DocumentId> {
    id.as_object_id()
        .map(DocumentId::from)
        .ok_or_else(|| StoreError::Deserialize(format!("identifier {id} is not an ObjectId")))
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, collection: Collection, filter: Filter) -> Result<Vec<Document>> {
        let documents: Vec<BsonDocument> = self
            .collection(collection)
            .find(to_bson(filter))
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(to_json).collect()
    }

    async fn find_one(&self, collection: Collection, id: DocumentId) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one(by_id(id))
            .await?
            .map(to_json)
            .transpose()
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOneResult> {
        let document = bson::to_document(&document)?;
        let result = self.collection(collection).insert_one(document).await?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: to_document_id(result.inserted_id)?,
        })
    }

    async fn upsert_fields(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Document,
    ) -> Result<UpdateResult> {
        let fields = bson::to_document(&fields)?;
        let result = self
            .collection(collection)
            .update_one(by_id(id), doc! { "$set": fields })
            .upsert(true)
            .await?;

        let upserted_id = result.upserted_id.map(to_document_id).transpose()?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id,
        })
    }

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult> {
        let result = self.collection(collection).delete_one(by_id(id)).await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        tracing::debug!("pinged mongodb deployment");
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("mongodb client closed");
    }
}
