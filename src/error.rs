//! Crate-wide HTTP error envelope.
//!
//! Every fallible handler returns `Result<T, AppError>`; `AppError`
//! implements `IntoResponse` so the conversion from a domain error to a
//! status code and JSON body happens in exactly one place, mirroring
//! `internal/apperrors.AppError`'s `{code, message}` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::catalog::CatalogError;
use crate::order::{OrderError, OrderServiceError};
use crate::promo::ValidationError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

/// A classified, HTTP-ready error. Each variant maps to exactly one
/// status code, matching the bad-input / not-found / internal taxonomy
/// used throughout the original handlers.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(m)
            | AppError::Unauthorized(m)
            | AppError::NotFound(m)
            | AppError::Internal(m) => m,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(message = self.message(), "request failed");
        } else {
            warn!(message = self.message(), "request rejected");
        }
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(id) => AppError::NotFound(format!("product not found with id {id}")),
            CatalogError::Database(err) => AppError::Internal(format!("database error: {err}")),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::ProductNotFound(id) => AppError::NotFound(format!("product not found: {id}")),
            OrderError::Database(err) => AppError::Internal(format!("database error: {err}")),
        }
    }
}

impl From<OrderServiceError> for AppError {
    fn from(e: OrderServiceError) -> Self {
        match e {
            OrderServiceError::EmptyItems => AppError::BadRequest(e.to_string()),
            OrderServiceError::NonPositiveQuantity => AppError::BadRequest(e.to_string()),
            OrderServiceError::Coupon(inner) => inner.into(),
            OrderServiceError::Repository(inner) => inner.into(),
        }
    }
}

/// Helper for handlers parsing a path-provided UUID.
pub fn parse_product_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("invalid ID supplied".to_string()))
}
