//! Service wiring: backing store and fuzzy matcher behind trait objects.

use std::sync::Arc;

use anyhow::Context;

use storefront_catalog::{
    list_categories, list_products, ApproximateMatcher, DocumentStore, FuzzyMatcher, ListError,
    ListProductsParams, ProductPage,
};
use storefront_core::Document;
use storefront_infra::{InMemoryDocumentStore, Seed};

use crate::config::{ApiConfig, StoreBackend};

/// Everything a request handler needs. Cheap to clone; holds no per-request
/// state.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn DocumentStore>,
    matcher: Arc<dyn FuzzyMatcher>,
    max_page_size: usize,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        matcher: Arc<dyn FuzzyMatcher>,
        max_page_size: usize,
    ) -> Self {
        Self {
            store,
            matcher,
            max_page_size,
        }
    }

    /// In-memory store with the default matcher and page size limits.
    pub fn in_memory(store: Arc<InMemoryDocumentStore>) -> Self {
        let defaults = ApiConfig::default();
        Self::new(
            store,
            Arc::new(ApproximateMatcher::new(defaults.search_threshold)),
            defaults.max_page_size,
        )
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    pub async fn list_categories(&self) -> Result<Vec<Document>, ListError> {
        list_categories(self.store.as_ref()).await
    }

    pub async fn list_products(&self, params: &ListProductsParams) -> Result<ProductPage, ListError> {
        list_products(self.store.as_ref(), self.matcher.as_ref(), params).await
    }
}

/// Build services from configuration.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Memory => Arc::new(build_in_memory_store(config)?),
        StoreBackend::Postgres => build_postgres_store(config).await?,
    };
    let matcher = Arc::new(ApproximateMatcher::new(config.search_threshold));

    Ok(AppServices::new(store, matcher, config.max_page_size))
}

fn build_in_memory_store(config: &ApiConfig) -> anyhow::Result<InMemoryDocumentStore> {
    let store = InMemoryDocumentStore::new();
    if let Some(path) = &config.seed_file {
        Seed::from_path(path)
            .and_then(|seed| seed.load_into(&store))
            .with_context(|| format!("failed to load seed file {}", path.display()))?;
    } else {
        tracing::warn!("SEED_FILE not set; in-memory store starts empty");
    }
    Ok(store)
}

#[cfg(feature = "postgres")]
async fn build_postgres_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set when STORE_BACKEND=postgres")?;
    let store = storefront_infra::PostgresDocumentStore::connect(url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn build_postgres_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    tracing::warn!("STORE_BACKEND=postgres but postgres feature not enabled, falling back to in-memory");
    Ok(Arc::new(build_in_memory_store(config)?))
}
