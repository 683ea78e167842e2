//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and matcher wiring
//! - `routes/`: HTTP routes + handlers (one file per endpoint area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around already wired services.
pub fn build_app(services: services::AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(Arc::new(services))))
}

/// Wire services from configuration and build the router (entrypoint used by `main.rs`).
pub async fn build_app_from_config(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(build_app(services))
}
