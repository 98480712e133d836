use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use bazaar_order::fulfillment::FulfillmentError;
use bazaar_order::store::OrderError;
use bazaar_shipping::rates::RateError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

// Domain errors are mapped explicitly; a blanket From impl for each would
// collide with the anyhow fallback above.

pub fn from_order(err: OrderError) -> AppError {
    match err {
        OrderError::Validation(msg) => AppError::ValidationError(msg),
        OrderError::NotFound(what) => AppError::NotFoundError(format!("not found: {what}")),
        OrderError::Storage(msg) => AppError::Anyhow(anyhow::anyhow!(msg)),
    }
}

pub fn from_fulfillment(err: FulfillmentError) -> AppError {
    match err {
        FulfillmentError::OrderNotFound(id) => {
            AppError::NotFoundError(format!("order not found: {id}"))
        }
        FulfillmentError::PaymentNotCaptured { .. } => AppError::ConflictError(err.to_string()),
        FulfillmentError::Store(inner) => from_order(inner),
    }
}

pub fn from_rate(err: RateError) -> AppError {
    match err {
        RateError::ProviderNotFound(id) => {
            AppError::NotFoundError(format!("shipping provider not found: {id}"))
        }
        RateError::Cache(msg) | RateError::Storage(msg) => AppError::Anyhow(anyhow::anyhow!(msg)),
    }
}
