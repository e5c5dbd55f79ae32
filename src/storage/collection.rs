use std::fmt;
use std::sync::Arc;

use super::engine::{DeleteResult, DocumentStore, InsertOneResult, UpdateResult};
use super::query::{FindOptions, Filter};
use super::update::{Update, UpdateOptions};
use crate::core::{Document, Result};

/// Live reference to one named collection of a connected store.
///
/// Cheap to clone; holds the shared store and the collection name, nothing
/// else. Handles are created per request and dropped with it.
#[derive(Clone)]
pub struct CollectionHandle {
    store: Arc<dyn DocumentStore>,
    name: String,
}

impl CollectionHandle {
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn find_all(&self) -> Result<Vec<Document>> {
        self.store.find(&self.name, &Filter::new(), &FindOptions::new()).await
    }

    pub async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>> {
        self.store.find(&self.name, filter, options).await
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        self.store.find_one(&self.name, filter).await
    }

    pub async fn insert_one(&self, document: Document) -> Result<InsertOneResult> {
        self.store.insert_one(&self.name, document).await
    }

    pub async fn update_one(&self, filter: &Filter, update: &Update, options: UpdateOptions) -> Result<UpdateResult> {
        self.store.update_one(&self.name, filter, update, options).await
    }

    pub async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<Option<Document>> {
        self.store
            .find_one_and_update(&self.name, filter, update, options)
            .await
    }

    pub async fn delete_one(&self, filter: &Filter) -> Result<DeleteResult> {
        self.store.delete_one(&self.name, filter).await
    }
}

impl fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
