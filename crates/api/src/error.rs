//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use checkout::CheckoutError;
use gateway::GatewayError;
use query::QueryError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// No authenticated session.
    Unauthorized,
    /// Authenticated, but not allowed to do this.
    Forbidden,
    /// Order lifecycle error.
    Checkout(CheckoutError),
    /// Catalog error.
    Catalog(CatalogError),
    /// Backend gateway failure.
    Gateway(GatewayError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "authentication required".to_string(),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "admin access required".to_string()),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Gateway(err) => gateway_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::Validation(_) | CheckoutError::EmptyCart => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        CheckoutError::StockValidationFailed(_)
        | CheckoutError::StockDecrementFailed { .. }
        | CheckoutError::StockRestoreFailed { .. }
        | CheckoutError::NotCancellable(_) => (StatusCode::CONFLICT, err.to_string()),
        CheckoutError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CheckoutError::OrderItemsFailed { .. } => {
            tracing::error!(error = %err, "order left without item rows");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        CheckoutError::Gateway(gateway_err) => gateway_error_to_response(gateway_err.clone()),
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CatalogError::ProductNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CatalogError::Gateway(gateway_err) => gateway_error_to_response(gateway_err.clone()),
    }
}

fn gateway_error_to_response(err: GatewayError) -> (StatusCode, String) {
    match &err {
        GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        GatewayError::Conflict(_) => (StatusCode::CONFLICT, err.to_string()),
        GatewayError::Unavailable(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::OrderNotFound(id) => ApiError::NotFound(format!("order {id} not found")),
            QueryError::Gateway(gateway_err) => ApiError::Gateway(gateway_err),
        }
    }
}
