//! Catalog listing logic.
//!
//! This crate holds the category and product listing pipelines, implemented
//! against narrow traits for the backing document store and the fuzzy matcher
//! (no HTTP, no concrete storage).

pub mod cursor;
pub mod fuzzy;
pub mod listing;
pub mod params;
pub mod store;

pub use cursor::PageCursor;
pub use fuzzy::{retain_matches, ApproximateMatcher, FuzzyMatcher};
pub use listing::{
    list_categories, list_products, ListError, ProductPage, CATEGORIES, CATEGORY_FIELD, PRICE_FIELD,
    PRODUCTS, TITLE_FIELD,
};
pub use params::{ListProductsParams, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use store::{
    compare_values, value_rank, values_equal, DocumentQuery, DocumentStore, Filter, OrderBy, SortDirection,
    StartAfter, StoreError,
};
