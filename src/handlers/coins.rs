//! Coin transfer HTTP handler.
//!
//! `POST /api/sendCoin` - transfer coins from the authenticated account to
//! another account.

use axum::{Extension, Json, extract::State};

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::ledger::{SendCoinRequest, SendCoinResponse},
    services::transfer_service,
};

/// Transfer coins to another account.
///
/// # Endpoint
///
/// `POST /api/sendCoin` (bearer token required)
///
/// # Request Body
///
/// ```json
/// {
///   "recipient_username": "bob",
///   "amount": 100
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: Both updated account views and the ledger entry
/// - **Error (400)**: Non-positive amount or insufficient funds
/// - **Error (401)**: Missing or invalid token
/// - **Error (404)**: Recipient (or sender) account unknown
/// - **Error (500)**: Store failure
///
/// # Atomicity
///
/// Both balances and the ledger entry are committed in a single unit of
/// work. Either the whole transfer happens or none of it does.
pub async fn send_coin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<SendCoinRequest>,
) -> Result<Json<SendCoinResponse>, AppError> {
    let outcome = transfer_service::execute_transfer(
        &state.store,
        &auth.username,
        &request.recipient_username,
        request.amount,
    )
    .await?;

    Ok(Json(SendCoinResponse {
        sender: outcome.sender.into(),
        recipient: outcome.recipient.into(),
        ledger_entry: outcome.entry,
    }))
}
