//! Ledger data models and API request/response types.
//!
//! This module defines:
//! - `LedgerEntry`: Database entity recording one completed transfer
//! - `CounterpartyTotal`: One row of the grouped sent/received aggregates
//! - `SendCoinRequest` / `SendCoinResponse`: Transfer exchange

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::AccountResponse;

/// Represents a ledger entry from the database.
///
/// # Database Table
///
/// Maps to the `ledger_entries` table. Each entry:
/// - Gets a monotonically increasing id assigned by the store
/// - References the sender and recipient accounts
/// - Is immutable once created, and never deleted
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct LedgerEntry {
    /// Store-assigned, monotonically increasing identifier
    pub id: i64,

    /// Account the coins came from
    pub sender_id: Uuid,

    /// Account the coins went to
    pub recipient_id: Uuid,

    /// Transferred amount in coins, always positive
    pub amount: i64,

    /// When the transfer committed
    pub created_at: DateTime<Utc>,
}

/// One row of a sent/received aggregate: a counterparty username and the
/// sum of all amounts exchanged with them.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct CounterpartyTotal {
    /// The other account's username
    pub counterparty: String,

    /// Sum of all transferred amounts
    pub total: i64,
}

/// Request body for POST /api/sendCoin.
///
/// # JSON Example
///
/// ```json
/// {
///   "recipient_username": "bob",
///   "amount": 100
/// }
/// ```
///
/// # Validation
///
/// - `amount` must be at least 1
/// - The sender must have sufficient balance
#[derive(Debug, Deserialize)]
pub struct SendCoinRequest {
    /// Username receiving the coins
    pub recipient_username: String,

    /// Amount to transfer in coins
    pub amount: i64,
}

/// Response body for POST /api/sendCoin.
///
/// # Atomicity Guarantee
///
/// Both balances and the ledger entry come out of one committed unit of
/// work; the two account views are consistent with each other.
#[derive(Debug, Serialize)]
pub struct SendCoinResponse {
    /// Sender account after the transfer
    pub sender: AccountResponse,

    /// Recipient account after the transfer
    pub recipient: AccountResponse,

    /// The recorded transfer
    pub ledger_entry: LedgerEntry,
}
