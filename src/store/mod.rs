//! Store contracts: one capability trait per entity family, all sharing one
//! unit-of-work abstraction.
//!
//! Every mutating operation takes an explicit transactional context (`Tx`)
//! instead of reaching for an ambient database handle, so the atomic-unit
//! boundaries of the services are visible in the signatures and the services
//! can be tested against the in-memory backend.
//!
//! # Backends
//!
//! - [`postgres::PgStore`]: production backend, `Tx` is a sqlx transaction
//! - [`memory::MemStore`]: in-memory backend for tests and local bring-up

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::Account;
use crate::models::catalog::CatalogItem;
use crate::models::inventory::InventoryLine;
use crate::models::ledger::{CounterpartyTotal, LedgerEntry};

/// Unit-of-work lifecycle shared by all entity-family stores.
///
/// One `Tx` value is one atomic unit: everything performed through it
/// becomes visible to other callers at `commit`, or not at all. Dropping a
/// `Tx` without committing discards its writes, so an early `?` return
/// inside a unit leaves no partial state.
#[async_trait]
pub trait Store: Send + Sync {
    /// Transactional context threaded through every store call.
    type Tx: Send;

    /// Open a new atomic unit of work.
    async fn begin(&self) -> Result<Self::Tx, AppError>;

    /// Commit the unit, publishing all of its writes at once.
    async fn commit(&self, tx: Self::Tx) -> Result<(), AppError>;

    /// Abandon the unit, discarding all of its writes.
    async fn rollback(&self, tx: Self::Tx) -> Result<(), AppError>;
}

/// Durable mapping from username to coin balance.
#[async_trait]
pub trait AccountStore: Store {
    /// Create an account with a starting balance of zero, or return the
    /// existing row when the username is already taken (including when a
    /// concurrent registration wins the race).
    async fn create_if_absent(
        &self,
        tx: &mut Self::Tx,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, AppError>;

    /// Fetch an account by username without locking it.
    async fn fetch(&self, tx: &mut Self::Tx, username: &str) -> Result<Option<Account>, AppError>;

    /// Fetch an account by username and hold its row lock until the unit
    /// ends. May be called for both parties of a transfer within one unit;
    /// re-locking a row the unit already holds does not self-deadlock.
    async fn fetch_for_update(
        &self,
        tx: &mut Self::Tx,
        username: &str,
    ) -> Result<Option<Account>, AppError>;

    /// Apply a relative balance change to an account the caller has locked
    /// in this unit, returning the updated row.
    async fn apply_delta(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        delta: i64,
    ) -> Result<Account, AppError>;
}

/// Append-only log of completed transfers.
#[async_trait]
pub trait LedgerStore: Store {
    /// Record one completed transfer. The store assigns a monotonically
    /// increasing id; content is never rejected, only storage errors fail.
    async fn append(
        &self,
        tx: &mut Self::Tx,
        sender_id: Uuid,
        recipient_id: Uuid,
        amount: i64,
    ) -> Result<LedgerEntry, AppError>;

    /// Amounts the account has sent, summed per recipient username.
    async fn sent_totals(
        &self,
        tx: &mut Self::Tx,
        sender_id: Uuid,
    ) -> Result<Vec<CounterpartyTotal>, AppError>;

    /// Amounts the account has received, summed per sender username.
    async fn received_totals(
        &self,
        tx: &mut Self::Tx,
        recipient_id: Uuid,
    ) -> Result<Vec<CounterpartyTotal>, AppError>;
}

/// Durable mapping from (owner, item kind) to owned quantity.
#[async_trait]
pub trait InventoryStore: Store {
    /// Fetch one inventory line by its composite key.
    async fn fetch_line(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
        item_kind: &str,
    ) -> Result<Option<InventoryLine>, AppError>;

    /// Add `quantity` to the (owner, kind) line, creating it if absent.
    /// First purchase inserts the row, later purchases increment it; either
    /// way exactly one row exists per pair afterwards.
    async fn add_or_create(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
        item_kind: &str,
        quantity: i64,
    ) -> Result<InventoryLine, AppError>;

    /// All inventory lines owned by an account, ordered by item kind.
    async fn lines_for_owner(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
    ) -> Result<Vec<InventoryLine>, AppError>;
}

/// Read-only price lookup over the seeded catalog.
#[async_trait]
pub trait CatalogStore: Store {
    /// Fetch a catalog item by name.
    async fn fetch_item(
        &self,
        tx: &mut Self::Tx,
        name: &str,
    ) -> Result<Option<CatalogItem>, AppError>;
}

/// Capability façade over all four entity families, mirroring the single
/// storage aggregate the handlers wire in.
pub trait CoinStore: AccountStore + LedgerStore + InventoryStore + CatalogStore {}

impl<S> CoinStore for S where S: AccountStore + LedgerStore + InventoryStore + CatalogStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{memory::MemStore, postgres::PgStore};

    fn assert_coin_store<S: CoinStore>() {}

    #[test]
    fn both_backends_cover_every_capability() {
        assert_coin_store::<MemStore>();
        assert_coin_store::<PgStore>();
    }
}
