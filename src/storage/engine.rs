use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::query::{FindOptions, Filter};
use super::update::{Update, UpdateOptions};
use crate::core::{Document, ObjectId, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: ObjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Document store backend - allows pluggable storage engines
///
/// Every single-document mutation (`update_one`, `find_one_and_update`,
/// `delete_one`, the upsert path included) must be atomic: the filter is
/// evaluated and the change applied without another mutation of the same
/// collection interleaving. Nothing is promised across documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter`, in insertion order unless `options` sorts.
    async fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let mut found = self
            .find(collection, filter, &FindOptions::new().limit(1))
            .await?;
        Ok(found.pop())
    }

    /// Store `document`, assigning `_id` when absent.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<InsertOneResult>;

    /// Update the first document matching `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<UpdateResult>;

    /// Like [`update_one`](Self::update_one) but returns the document as it is
    /// after the update, or `None` when nothing matched and nothing was upserted.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<Option<Document>>;

    /// Remove the first document matching `filter`.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult>;

    async fn collection_names(&self) -> Result<Vec<String>>;

    /// Copy of every collection, for snapshots.
    async fn dump(&self) -> Result<BTreeMap<String, Vec<Document>>>;
}
