use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_products))
}

#[tracing::instrument(name = "list_products", skip_all)]
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> axum::response::Response {
    let query = match query {
        Ok(Query(pairs)) => dto::ProductsQuery::from_pairs(pairs),
        Err(e) => {
            tracing::debug!(error = %e, "rejecting malformed query string");
            return errors::json_error(StatusCode::BAD_REQUEST, errors::INVALID_QUERY);
        }
    };

    let params = match query.into_params(services.max_page_size()) {
        Ok(p) => p,
        Err(e) => return errors::list_error_to_response(e, errors::FETCH_PRODUCTS_FAILED),
    };

    match services.list_products(&params).await {
        Ok(page) => (StatusCode::OK, Json(dto::ProductsResponse::from(page))).into_response(),
        Err(e) => errors::list_error_to_response(e, errors::FETCH_PRODUCTS_FAILED),
    }
}
