//! In-process router tests (no socket), including backend failure paths.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use storefront_api::app::{build_app, services::AppServices};
use storefront_catalog::{ApproximateMatcher, DocumentQuery, DocumentStore, StoreError};
use storefront_core::{Document, DocumentId, Fields};
use storefront_infra::InMemoryDocumentStore;

/// Store that fails every call, with detail that must not leak to clients.
struct BrokenStore;

#[async_trait::async_trait]
impl DocumentStore for BrokenStore {
    async fn scan(&self, _collection: &str) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Unavailable("password authentication failed for user admin".into()))
    }

    async fn query(&self, _query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Query("relation \"documents\" does not exist".into()))
    }
}

async fn call(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let res = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn broken_app() -> axum::Router {
    build_app(AppServices::new(
        Arc::new(BrokenStore),
        Arc::new(ApproximateMatcher::default()),
        100,
    ))
}

#[tokio::test]
async fn category_backend_failure_is_generic_500() {
    let (status, body) = call(broken_app(), "/categories").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch categories" }));
}

#[tokio::test]
async fn product_backend_failure_is_generic_500() {
    let (status, body) = call(broken_app(), "/products?search=phone").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch products" }));
}

#[tokio::test]
async fn cursor_lookup_failure_is_500_not_400() {
    let (status, body) = call(broken_app(), "/products?lastVisibleId=p1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch products" }));
}

#[tokio::test]
async fn invalid_page_is_rejected_before_querying() {
    let (status, body) = call(broken_app(), "/products?page=-1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid page" }));
}

#[tokio::test]
async fn limit_is_clamped_to_configured_maximum() {
    let store = Arc::new(InMemoryDocumentStore::new());
    for i in 0..5 {
        let fields: Fields = match json!({ "title": format!("Item {i}"), "price": i }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.upsert("products", DocumentId::new(format!("p{i}")).unwrap(), fields);
    }
    let app = build_app(AppServices::new(store, Arc::new(ApproximateMatcher::default()), 2));

    let (status, body) = call(app, "/products?limit=50&sort=sideways").await;

    assert_eq!(status, StatusCode::OK);
    let prices: Vec<_> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price"].clone())
        .collect();
    assert_eq!(prices, vec![json!(0), json!(1)]);
    assert_eq!(body["lastVisibleId"], "p1");
}

#[tokio::test]
async fn repeated_limit_uses_first_value() {
    let store = Arc::new(InMemoryDocumentStore::new());
    for i in 0..5 {
        let fields: Fields = match json!({ "title": format!("Item {i}"), "price": i }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.upsert("products", DocumentId::new(format!("p{i}")).unwrap(), fields);
    }
    let app = build_app(AppServices::in_memory(store));

    let (status, body) = call(app, "/products?limit=2&limit=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["lastVisibleId"], "p1");
}
