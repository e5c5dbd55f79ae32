use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::engine::{DeleteResult, DocumentStore, InsertOneResult, UpdateResult};
use super::query::{FindOptions, Filter};
use super::update::{Update, UpdateOptions};
use crate::core::{Document, ObjectId, Result, StoreError, document_id, set_document_id};

/// Documents of one collection, kept in insertion order.
#[derive(Debug, Default)]
struct CollectionData {
    documents: BTreeMap<u64, Document>,
    ids: HashMap<ObjectId, u64>,
    next_seq: u64,
}

impl CollectionData {
    fn insert(&mut self, mut document: Document) -> Result<ObjectId> {
        // Stored `_id` is always the canonical lowercase hex.
        let id = document_id(&document)?.unwrap_or_else(ObjectId::new);
        set_document_id(&mut document, id);

        if self.ids.contains_key(&id) {
            return Err(StoreError::DuplicateKey(format!("_id {id} already exists")));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.documents.insert(seq, document);
        self.ids.insert(id, seq);
        Ok(id)
    }

    /// Sequence number of the first document matching `filter`.
    fn first_match(&self, filter: &Filter) -> Option<u64> {
        if let Some(id) = filter.pinned_id() {
            let seq = *self.ids.get(&id)?;
            return self
                .documents
                .get(&seq)
                .filter(|doc| filter.matches(doc))
                .map(|_| seq);
        }

        self.documents
            .iter()
            .find(|(_, doc)| filter.matches(doc))
            .map(|(seq, _)| *seq)
    }

    fn scan(&self, filter: &Filter) -> Vec<Document> {
        if filter.pinned_id().is_some() {
            return self
                .first_match(filter)
                .and_then(|seq| self.documents.get(&seq))
                .cloned()
                .into_iter()
                .collect();
        }

        self.documents
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect()
    }

    /// Apply `update` to the first match, upserting if asked.
    ///
    /// Returns the result together with the document's post-update state.
    fn update(&mut self, filter: &Filter, update: &Update, options: UpdateOptions) -> Result<(UpdateResult, Option<Document>)> {
        if let Some(seq) = self.first_match(filter) {
            let Some(current) = self.documents.get_mut(&seq) else {
                return Ok((acknowledged_update(), None));
            };
            let mut updated = current.clone();
            let modified = update.apply(&mut updated)?;
            *current = updated.clone();

            let result = UpdateResult {
                matched_count: 1,
                modified_count: u64::from(modified),
                ..acknowledged_update()
            };
            return Ok((result, Some(updated)));
        }

        if !options.upsert {
            return Ok((acknowledged_update(), None));
        }

        let mut seeded = Document::new();
        for (field, value) in filter.equalities() {
            seeded.insert(field.to_string(), value.clone());
        }
        update.apply(&mut seeded)?;
        let id = self.insert(seeded)?;
        let created = self.ids.get(&id).and_then(|seq| self.documents.get(seq)).cloned();

        let result = UpdateResult {
            upserted_count: 1,
            upserted_id: Some(id),
            ..acknowledged_update()
        };
        Ok((result, created))
    }

    fn delete(&mut self, filter: &Filter) -> DeleteResult {
        let Some(seq) = self.first_match(filter) else {
            return DeleteResult {
                acknowledged: true,
                deleted_count: 0,
            };
        };

        if let Some(doc) = self.documents.remove(&seq) {
            if let Ok(Some(id)) = document_id(&doc) {
                self.ids.remove(&id);
            }
        }
        DeleteResult {
            acknowledged: true,
            deleted_count: 1,
        }
    }
}

fn acknowledged_update() -> UpdateResult {
    UpdateResult {
        acknowledged: true,
        ..UpdateResult::default()
    }
}

/// Process-local document store.
///
/// Each collection sits behind its own lock, so writers to different
/// collections never wait on each other. Collections spring into existence on
/// first insert or upsert; reading an unknown collection yields nothing.
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Arc<RwLock<CollectionData>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Build a store pre-populated with `collections`.
    ///
    /// Documents without `_id` get one; duplicate identifiers are rejected.
    pub fn from_collections(collections: BTreeMap<String, Vec<Document>>) -> Result<Self> {
        let mut tables = HashMap::with_capacity(collections.len());
        for (name, documents) in collections {
            let mut data = CollectionData::default();
            for document in documents {
                data.insert(document)?;
            }
            tables.insert(name, Arc::new(RwLock::new(data)));
        }
        Ok(Self {
            collections: RwLock::new(tables),
        })
    }

    /// Handle on an existing collection, for concurrent access
    async fn get_collection(&self, name: &str) -> Option<Arc<RwLock<CollectionData>>> {
        self.collections.read().await.get(name).cloned()
    }

    async fn get_or_create_collection(&self, name: &str) -> Arc<RwLock<CollectionData>> {
        if let Some(existing) = self.get_collection(name).await {
            return existing;
        }

        let mut collections = self.collections.write().await;
        collections
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(collection = %name, "creating collection");
                Arc::new(RwLock::new(CollectionData::default()))
            })
            .clone()
    }

    async fn collection_for_update(&self, name: &str, options: UpdateOptions) -> Option<Arc<RwLock<CollectionData>>> {
        if options.upsert {
            Some(self.get_or_create_collection(name).await)
        } else {
            self.get_collection(name).await
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>> {
        let Some(handle) = self.get_collection(collection).await else {
            return Ok(Vec::new());
        };
        let documents = handle.read().await.scan(filter);
        Ok(options.apply(documents))
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<InsertOneResult> {
        let handle = self.get_or_create_collection(collection).await;
        let inserted_id = handle.write().await.insert(document)?;
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<UpdateResult> {
        let Some(handle) = self.collection_for_update(collection, options).await else {
            return Ok(acknowledged_update());
        };
        let (result, _) = handle.write().await.update(filter, update, options)?;
        Ok(result)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<Option<Document>> {
        let Some(handle) = self.collection_for_update(collection, options).await else {
            return Ok(None);
        };
        let (_, document) = handle.write().await.update(filter, update, options)?;
        Ok(document)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult> {
        let Some(handle) = self.get_collection(collection).await else {
            return Ok(DeleteResult {
                acknowledged: true,
                deleted_count: 0,
            });
        };
        let result = handle.write().await.delete(filter);
        Ok(result)
    }

    async fn collection_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn dump(&self) -> Result<BTreeMap<String, Vec<Document>>> {
        let handles: Vec<(String, Arc<RwLock<CollectionData>>)> = self
            .collections
            .read()
            .await
            .iter()
            .map(|(name, handle)| (name.clone(), Arc::clone(handle)))
            .collect();

        let mut dumped = BTreeMap::new();
        for (name, handle) in handles {
            let data = handle.read().await;
            dumped.insert(name, data.documents.values().cloned().collect());
        }
        Ok(dumped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document_from_json;
    use crate::storage::SortDirection;
    use serde_json::{Value as JsonValue, json};

    fn doc(value: JsonValue) -> Document {
        document_from_json(value).unwrap()
    }

    #[tokio::test]
    async fn unknown_collection_reads_empty() {
        let store = InMemoryStore::new();
        let found = store.find("nothing", &Filter::new(), &FindOptions::new()).await.unwrap();
        assert!(found.is_empty());
        assert!(store.collection_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_assigns_id_and_preserves_order() {
        let store = InMemoryStore::new();
        for title in ["first", "second", "third"] {
            store.insert_one("lessons", doc(json!({"title": title}))).await.unwrap();
        }

        let found = store.find("lessons", &Filter::new(), &FindOptions::new()).await.unwrap();
        let titles: Vec<_> = found.iter().map(|d| d["title"].clone()).collect();
        assert_eq!(titles, vec![json!("first"), json!("second"), json!("third")]);
        assert!(found.iter().all(|d| d.contains_key("_id")));
    }

    #[tokio::test]
    async fn duplicate_explicit_id_is_rejected() {
        let store = InMemoryStore::new();
        let body = doc(json!({"_id": "65a1b2c3d4e5f60718293a4b", "title": "x"}));
        store.insert_one("lessons", body.clone()).await.unwrap();
        let err = store.insert_one("lessons", body).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn explicit_id_is_stored_lowercase() {
        let store = InMemoryStore::new();
        let body = doc(json!({"_id": "65A1B2C3D4E5F60718293A4B", "title": "x"}));
        let inserted = store.insert_one("lessons", body).await.unwrap();
        assert_eq!(inserted.inserted_id.to_hex(), "65a1b2c3d4e5f60718293a4b");

        let found = store.find_one("lessons", &Filter::by_id(inserted.inserted_id)).await.unwrap();
        assert_eq!(found.unwrap()["_id"], "65a1b2c3d4e5f60718293a4b");

        let deleted = store.delete_one("lessons", &Filter::by_id(inserted.inserted_id)).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);
    }

    #[tokio::test]
    async fn conditional_update_respects_filter() {
        let store = InMemoryStore::new();
        let inserted = store.insert_one("courses", doc(json!({"Space": 1}))).await.unwrap();
        let filter = Filter::by_id(inserted.inserted_id).gt("Space", 0.0);
        let update = Update::new().inc("Space", -1);

        let first = store.update_one("courses", &filter, &update, UpdateOptions::default()).await.unwrap();
        assert_eq!(first.matched_count, 1);
        let second = store.update_one("courses", &filter, &update, UpdateOptions::default()).await.unwrap();
        assert_eq!(second.matched_count, 0);

        let course = store.find_one("courses", &Filter::by_id(inserted.inserted_id)).await.unwrap().unwrap();
        assert_eq!(course["Space"], json!(0));
    }

    #[tokio::test]
    async fn upsert_seeds_from_equalities() {
        let store = InMemoryStore::new();
        let filter = Filter::new().eq("courseId", "abc");
        let update = Update::new().inc("quantity", 1);

        let created = store.update_one("cart", &filter, &update, UpdateOptions::upsert()).await.unwrap();
        assert_eq!(created.upserted_count, 1);
        assert!(created.upserted_id.is_some());

        let bumped = store
            .find_one_and_update("cart", &filter, &update, UpdateOptions::upsert())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bumped["quantity"], json!(2));
        assert_eq!(bumped["courseId"], json!("abc"));
    }

    #[tokio::test]
    async fn update_without_upsert_does_not_create_collection() {
        let store = InMemoryStore::new();
        let result = store
            .update_one("cart", &Filter::new().eq("courseId", "abc"), &Update::new().inc("quantity", -1), UpdateOptions::default())
            .await
            .unwrap();
        assert_eq!(result.matched_count, 0);
        assert!(store.collection_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_only_first_match() {
        let store = InMemoryStore::new();
        for n in [1, 1, 2] {
            store.insert_one("nums", doc(json!({"n": n}))).await.unwrap();
        }
        let deleted = store.delete_one("nums", &Filter::new().eq("n", 1)).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);

        let left = store
            .find("nums", &Filter::new(), &FindOptions::new().sort("n", SortDirection::Ascending))
            .await
            .unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(left[0]["n"], json!(1));
    }

    #[tokio::test]
    async fn from_collections_round_trips_through_dump() {
        let mut seed = BTreeMap::new();
        seed.insert("courses".to_string(), vec![doc(json!({"name": "Art", "Space": 5}))]);
        let store = InMemoryStore::from_collections(seed).unwrap();

        let dumped = store.dump().await.unwrap();
        assert_eq!(dumped["courses"].len(), 1);
        assert_eq!(dumped["courses"][0]["name"], json!("Art"));
        assert!(dumped["courses"][0].contains_key("_id"));
    }
}
