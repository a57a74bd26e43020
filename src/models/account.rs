//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: Database entity representing a user's coin balance record
//! - `AuthRequest` / `AuthResponse`: Authentication exchange
//! - `AccountResponse`: Response body returned to clients
//! - `UserInfoResponse`: Aggregate user view for GET /api/info

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::inventory::InventoryLine;
use crate::models::ledger::CounterpartyTotal;

/// Represents an account record from the database.
///
/// # Database Table
///
/// Maps to the `accounts` table. Each account:
/// - Is keyed by a unique, immutable username (the authenticated identity)
/// - Holds a balance in whole coins
///
/// # Balance Storage
///
/// Balances are stored as `i64` whole coins and are never negative
/// (enforced by a database CHECK constraint and re-checked by the services
/// before every debit).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// Unique identifier for this account
    pub id: Uuid,

    /// Unique username, immutable after creation
    pub username: String,

    /// bcrypt hash of the account password
    ///
    /// Never serialized; responses go through [`AccountResponse`].
    pub password_hash: String,

    /// Current balance in coins
    pub balance: i64,

    /// Timestamp when account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of last balance update
    pub updated_at: DateTime<Utc>,
}

/// Request body for POST /api/auth.
///
/// A first authentication with an unknown username registers the account;
/// later ones verify the password.
///
/// # JSON Example
///
/// ```json
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Response body for POST /api/auth.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed bearer token for the authenticated account
    pub token: String,
}

/// Response body for account views.
///
/// # JSON Example
///
/// ```json
/// {
///   "username": "alice",
///   "balance": 900,
///   "created_at": "2025-06-01T10:00:00Z",
///   "updated_at": "2025-06-01T10:05:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account username
    pub username: String,

    /// Current balance in coins
    pub balance: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Convert database Account to API AccountResponse.
///
/// This transformation removes the internal `id` and `password_hash` fields.
impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            username: account.username,
            balance: account.balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Response body for GET /api/info: the full user view.
#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    /// The caller's account
    pub account: AccountResponse,

    /// All inventory lines owned by the caller
    pub inventory: Vec<InventoryLine>,

    /// Coins sent, summed per recipient
    pub sent: Vec<CounterpartyTotal>,

    /// Coins received, summed per sender
    pub received: Vec<CounterpartyTotal>,
}
