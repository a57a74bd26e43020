//! Inventory data models and API request/response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::AccountResponse;

/// Represents an inventory line from the database.
///
/// # Database Table
///
/// Maps to the `inventory_lines` table, keyed by `(owner_id, item_kind)`.
/// A line is created by the first purchase of a kind and its quantity grows
/// with every later purchase; a line never exists with quantity 0.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct InventoryLine {
    /// Owning account
    pub owner_id: Uuid,

    /// Catalog item name
    pub item_kind: String,

    /// Owned quantity, always positive
    pub quantity: i64,
}

/// Request body for POST /api/buy/{item}.
///
/// # JSON Example
///
/// ```json
/// {
///   "quantity": 2
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct BuyItemRequest {
    /// Number of units to buy, at least 1
    pub quantity: i64,
}

/// Response body for POST /api/buy/{item}.
#[derive(Debug, Serialize)]
pub struct BuyItemResponse {
    /// Buyer account after the debit
    pub account: AccountResponse,

    /// Catalog price of one unit
    pub unit_price: i64,

    /// The updated or newly created inventory line
    pub inventory: InventoryLine,
}
