//! Authentication HTTP handler.
//!
//! `POST /api/auth` - authenticate (registering on first contact) and
//! receive a bearer token.

use axum::{Json, extract::State};

use crate::{
    AppState, auth,
    error::AppError,
    models::account::{AuthRequest, AuthResponse},
    services::account_service,
};

/// Authenticate a user and issue an access token.
///
/// # Endpoint
///
/// `POST /api/auth` (public)
///
/// # Request Body
///
/// ```json
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{"token": "<jwt>"}`
/// - **Error (400)**: Empty username or password
/// - **Error (401)**: Password does not match the existing account
/// - **Error (500)**: Store or hashing failure
///
/// An unknown username is registered on the spot with a zero balance, so
/// the first authentication doubles as sign-up.
pub async fn authorize(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let account =
        account_service::authenticate_or_register(&state.store, &request.username, &request.password)
            .await?;

    let token = auth::issue_token(
        &account.username,
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
    )?;

    Ok(Json(AuthResponse { token }))
}
