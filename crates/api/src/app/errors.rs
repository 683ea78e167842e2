use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_catalog::ListError;

pub const FETCH_CATEGORIES_FAILED: &str = "Failed to fetch categories";
pub const FETCH_PRODUCTS_FAILED: &str = "Failed to fetch products";
pub const INVALID_CURSOR: &str = "Invalid lastVisibleId";
pub const INVALID_QUERY: &str = "Invalid query string";

/// Map a listing failure to a response.
///
/// Client errors get a 400 naming the offending input. Backend errors are
/// logged and answered with `backend_message` only; their detail never reaches
/// the client.
pub fn list_error_to_response(err: ListError, backend_message: &'static str) -> axum::response::Response {
    match err {
        ListError::InvalidCursor(cursor) => {
            tracing::debug!(cursor = %cursor, "rejecting unresolvable cursor");
            json_error(StatusCode::BAD_REQUEST, INVALID_CURSOR)
        }
        ListError::InvalidParameter { name, value } => {
            tracing::debug!(parameter = name, value = %value, "rejecting invalid parameter");
            json_error(StatusCode::BAD_REQUEST, format!("Invalid {name}"))
        }
        ListError::Backend(e) => {
            tracing::error!(error = %e, "{backend_message}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, backend_message)
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}
