//! Catalog purchase HTTP handler.
//!
//! `POST /api/buy/{item}` - spend coins on a catalog item.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::inventory::{BuyItemRequest, BuyItemResponse},
    services::purchase_service,
};

/// Buy a quantity of one catalog item.
///
/// # Endpoint
///
/// `POST /api/buy/{item}` (bearer token required)
///
/// # Request Body
///
/// ```json
/// {
///   "quantity": 2
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: Updated account view, unit price, inventory line
/// - **Error (400)**: Non-positive quantity or insufficient funds
/// - **Error (401)**: Missing or invalid token
/// - **Error (404)**: Item not in the catalog
/// - **Error (500)**: Store failure
///
/// # Atomicity
///
/// The balance debit and the inventory credit commit as one unit of work;
/// a debit is never observable without its matching inventory line update.
pub async fn buy_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(item): Path<String>,
    Json(request): Json<BuyItemRequest>,
) -> Result<Json<BuyItemResponse>, AppError> {
    let outcome =
        purchase_service::execute_purchase(&state.store, &auth.username, &item, request.quantity)
            .await?;

    Ok(Json(BuyItemResponse {
        account: outcome.buyer.into(),
        unit_price: outcome.unit_price,
        inventory: outcome.line,
    }))
}
