//! Error types and HTTP error response handling.
//!
//! This module defines the application's closed error taxonomy and how each
//! variant is converted into an HTTP response with a status code and JSON body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Business outcomes (`InsufficientFunds`, `InvalidInput`) are expected and
/// returned to the caller as rejections; `Conflict`, `Hashing` and `Database`
/// are infrastructure failures surfaced as a generic server error.
///
/// # Error Categories
///
/// - **Resource Errors**: Requested account or catalog item not found
/// - **Business Logic Errors**: Operations that violate business rules
/// - **Validation Errors**: Invalid request data
/// - **Authentication Errors**: Bad credentials or missing/invalid token
/// - **Storage Errors**: Write conflicts and any sqlx::Error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Requested account does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Account not found")]
    AccountNotFound,

    /// Requested catalog item does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Item not found")]
    ItemNotFound,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidInput(String),

    /// Account balance does not cover the requested transfer or purchase.
    ///
    /// Returns HTTP 400 Bad Request. This is a business outcome, not a defect.
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Username/password pair did not match an account.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bearer token is missing, malformed, expired, or forged.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Missing or invalid token")]
    InvalidToken,

    /// Concurrent writers collided and the storage layer gave up
    /// (serialization failure or deadlock).
    ///
    /// Returns HTTP 500 with a generic body.
    #[error("Write conflict")]
    Conflict,

    /// Password hashing failed.
    ///
    /// Returns HTTP 500 with a generic body.
    #[error("Password hashing error")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Token issuance failed.
    ///
    /// Returns HTTP 500 with a generic body. Verification failures are
    /// `InvalidToken`, not this variant.
    #[error("Token error")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `AccountNotFound` / `ItemNotFound` → 404 Not Found
/// - `InvalidInput` / `InsufficientFunds` → 400 Bad Request
/// - `InvalidCredentials` / `InvalidToken` → 401 Unauthorized
/// - `Conflict` / `Hashing` / `Token` / `Database` → 500 Internal Server Error
///   (hides details from the client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::AccountNotFound => {
                (StatusCode::NOT_FOUND, "account_not_found", self.to_string())
            }
            AppError::ItemNotFound => (StatusCode::NOT_FOUND, "item_not_found", self.to_string()),
            AppError::InvalidInput(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::InsufficientFunds => (
                StatusCode::BAD_REQUEST,
                "insufficient_funds",
                self.to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string())
            }
            AppError::Conflict
            | AppError::Hashing(_)
            | AppError::Token(_)
            | AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejections_map_to_client_errors() {
        let resp = AppError::InsufficientFunds.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::InvalidInput("amount must be at least 1".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::AccountNotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_failures_map_to_server_errors() {
        let resp = AppError::Conflict.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = AppError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_failures_map_to_unauthorized() {
        let resp = AppError::InvalidToken.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AppError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
