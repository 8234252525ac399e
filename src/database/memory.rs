//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, ID_FIELD,
    InsertOneResult, Result, UpdateResult,
};

/// Store keeping every collection in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

fn has_id(document: &Document, id: DocumentId) -> bool {
    document.get(ID_FIELD).and_then(Value::as_str) == Some(id.to_string().as_str())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: Collection, filter: Filter) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, id: DocumentId) -> Result<Option<Document>> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|document| has_id(document, id)))
            .cloned())
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> Result<InsertOneResult> {
        let id = DocumentId::generate();
        document.insert(ID_FIELD.to_owned(), Value::String(id.to_string()));

        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn upsert_fields(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Document,
    ) -> Result<UpdateResult> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        if let Some(document) = documents.iter_mut().find(|document| has_id(document, id)) {
            let mut modified = false;
            for (key, value) in fields {
                if key == ID_FIELD {
                    continue;
                }
                if document.get(&key) != Some(&value) {
                    document.insert(key, value);
                    modified = true;
                }
            }

            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        let mut document = Document::new();
        document.insert(ID_FIELD.to_owned(), Value::String(id.to_string()));
        document.extend(fields.into_iter().filter(|(key, _)| key != ID_FIELD));
        documents.push(document);

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        })
    }

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult> {
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(documents) => match documents.iter().position(|document| has_id(document, id)) {
                Some(index) => {
                    documents.remove(index);
                    1
                },
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {
        self.collections.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::default();
        let first = store
            .insert_one(Collection::Bookings, document(json!({ "userEmail": "a@example.com" })))
            .await
            .unwrap();
        store
            .insert_one(Collection::Bookings, document(json!({ "userEmail": "b@example.com" })))
            .await
            .unwrap();

        let all = store.find(Collection::Bookings, Filter::All).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(store.find(Collection::Services, Filter::All).await.unwrap().is_empty());

        let found = store
            .find(
                Collection::Bookings,
                Filter::eq_or_all("userEmail", Some("a@example.com".into())),
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0][ID_FIELD], json!(first.inserted_id.to_string()));

        let one = store
            .find_one(Collection::Bookings, first.inserted_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(one["userEmail"], json!("a@example.com"));
        assert!(store
            .find_one(Collection::Services, first.inserted_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_upsert() {
        let store = MemoryStore::default();
        let id = DocumentId::generate();

        let created = store
            .upsert_fields(Collection::Services, id, document(json!({ "service_name": "Sundarbans" })))
            .await
            .unwrap();
        assert_eq!(created.upserted_count, 1);
        assert_eq!(created.upserted_id, Some(id));

        let updated = store
            .upsert_fields(Collection::Services, id, document(json!({ "service_name": "Srimangal" })))
            .await
            .unwrap();
        assert_eq!((updated.matched_count, updated.modified_count), (1, 1));

        let unchanged = store
            .upsert_fields(Collection::Services, id, document(json!({ "service_name": "Srimangal" })))
            .await
            .unwrap();
        assert_eq!((unchanged.matched_count, unchanged.modified_count), (1, 0));

        let all = store.find(Collection::Services, Filter::All).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["service_name"], json!("Srimangal"));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::default();
        let inserted = store
            .insert_one(Collection::Services, Document::new())
            .await
            .unwrap();

        let deleted = store
            .delete_one(Collection::Services, inserted.inserted_id)
            .await
            .unwrap();
        assert_eq!(deleted.deleted_count, 1);

        let deleted = store
            .delete_one(Collection::Services, inserted.inserted_id)
            .await
            .unwrap();
        assert_eq!(deleted.deleted_count, 0);
    }
}
