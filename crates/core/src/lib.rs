//! `storefront-core`: shared building blocks for the catalog service.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod document;
pub mod error;
pub mod id;

pub use document::{Document, Fields};
pub use error::DomainError;
pub use id::DocumentId;
