use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use storefront_catalog::{DocumentQuery, DocumentStore, StoreError};
use storefront_core::{Document, DocumentId, Fields};

/// In-memory document store.
///
/// Intended for tests/dev. Queries are evaluated with
/// [`DocumentQuery::apply`] over a snapshot of the collection; natural scan
/// order is id order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<DocumentId, Fields>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document under a freshly generated id.
    pub fn insert(&self, collection: &str, fields: Fields) -> DocumentId {
        let id = DocumentId::generate();
        self.upsert(collection, id.clone(), fields);
        id
    }

    /// Insert or replace the document with the given id. Fields are stored
    /// as given, including any `id` key of their own.
    pub fn upsert(&self, collection: &str, id: DocumentId, fields: Fields) {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, fields);
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn snapshot(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn scan(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.snapshot(collection)
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        Ok(query.apply(self.snapshot(&query.collection)?))
    }
}
