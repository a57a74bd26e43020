//! User info HTTP handler.
//!
//! `GET /api/info` - the authenticated user's balance, inventory and
//! transfer history aggregates.

use axum::{Extension, Json, extract::State};

use crate::{
    AppState, error::AppError, middleware::auth::AuthContext, models::account::UserInfoResponse,
    services::query_service,
};

/// Return the caller's aggregated view.
///
/// # Endpoint
///
/// `GET /api/info` (bearer token required)
///
/// # Response
///
/// - **Success (200 OK)**:
///
/// ```json
/// {
///   "account": {"username": "alice", "balance": 900, "...": "..."},
///   "inventory": [{"item_kind": "cup", "quantity": 2, "...": "..."}],
///   "sent": [{"counterparty": "bob", "total": 100}],
///   "received": []
/// }
/// ```
///
/// - **Error (401)**: Missing or invalid token
/// - **Error (404)**: Authenticated account no longer resolves
/// - **Error (500)**: Store failure
pub async fn user_info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserInfoResponse>, AppError> {
    let view = query_service::get_user_view(&state.store, &auth.username).await?;

    Ok(Json(UserInfoResponse {
        account: view.account.into(),
        inventory: view.inventory,
        sent: view.sent,
        received: view.received,
    }))
}
