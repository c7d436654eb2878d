//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{BookingError, DomainError, UserError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or invalid bearer token.
    Unauthorized(String),
    /// Booking engine rejection or failure.
    Booking(BookingError),
    /// Lookup error.
    Domain(DomainError),
    /// Identity error.
    User(UserError),
    /// Internal server error.
    Internal(String),
}

/// Message returned for infrastructure failures. Internal details stay in the logs.
const GENERIC_FAILURE: &str = "The request could not be completed, please try again later";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Booking(err) => booking_error_to_response(err),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::User(err) => user_error_to_response(err),
            ApiError::Internal(msg) => internal(msg),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn internal(detail: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!(error = %detail, "internal server error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        GENERIC_FAILURE.to_string(),
    )
}

fn booking_error_to_response(err: BookingError) -> (StatusCode, String) {
    match &err {
        BookingError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        BookingError::EventNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        BookingError::InsufficientInventory { .. } => (StatusCode::CONFLICT, err.to_string()),
        // The booking may or may not have committed; the caller cannot tell.
        BookingError::Infrastructure(_) => internal(err),
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::Store(_) => internal(err),
    }
}

fn user_error_to_response(err: UserError) -> (StatusCode, String) {
    match &err {
        UserError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        UserError::DuplicateEmail(_) => (StatusCode::CONFLICT, err.to_string()),
        UserError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        UserError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        UserError::PasswordHash(_) | UserError::Store(_) => internal(err),
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        ApiError::User(err)
    }
}
