//! Infrastructure layer: document store adapters.

pub mod document_store;

pub use document_store::{InMemoryDocumentStore, Seed, SeedError};
#[cfg(feature = "postgres")]
pub use document_store::PostgresDocumentStore;
