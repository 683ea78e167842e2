//! JSON seed data for the in-memory store.
//!
//! A seed file maps collection names to arrays of documents:
//!
//! ```json
//! {
//!   "categories": [{ "id": "electronics", "name": "Electronics" }],
//!   "products": [{ "title": "iPhone", "category": "electronics", "price": 999 }]
//! }
//! ```
//!
//! A document's `id` is used as its store id when present; otherwise one is
//! generated. Fields are stored as written, `id` included.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use storefront_core::{DocumentId, Fields};

use super::InMemoryDocumentStore;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed seed data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid document #{index} in `{collection}`: {reason}")]
    InvalidDocument {
        collection: String,
        index: usize,
        reason: String,
    },
}

/// Parsed seed data, keyed by collection.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Seed(BTreeMap<String, Vec<Fields>>);

impl Seed {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load every document into `store`. Returns the number of documents loaded.
    ///
    /// Validates all documents before writing any.
    pub fn load_into(self, store: &InMemoryDocumentStore) -> Result<usize, SeedError> {
        let mut staged = Vec::new();
        for (collection, docs) in self.0 {
            for (index, fields) in docs.into_iter().enumerate() {
                let id = match fields.get("id") {
                    None => None,
                    Some(Value::String(raw)) => Some(DocumentId::new(raw.as_str()).map_err(|e| {
                        SeedError::InvalidDocument {
                            collection: collection.clone(),
                            index,
                            reason: e.to_string(),
                        }
                    })?),
                    Some(other) => {
                        return Err(SeedError::InvalidDocument {
                            collection,
                            index,
                            reason: format!("`id` must be a string, got {other}"),
                        });
                    }
                };
                staged.push((collection.clone(), id, fields));
            }
        }

        let count = staged.len();
        for (collection, id, fields) in staged {
            match id {
                Some(id) => store.upsert(&collection, id, fields),
                None => {
                    store.insert(&collection, fields);
                }
            }
        }
        tracing::info!(documents = count, "loaded seed data");
        Ok(count)
    }
}
