//! Purchase service - Core business logic for catalog purchases.
//!
//! This service handles:
//! - Catalog price lookup
//! - Balance validation under the buyer's row lock
//! - Atomic debit + inventory upsert
//!
//! # Atomicity Guarantees
//!
//! The balance debit and the inventory credit commit as one unit of work;
//! neither is ever observable without the other.

use crate::error::AppError;
use crate::models::account::Account;
use crate::models::inventory::InventoryLine;
use crate::store::{AccountStore, CatalogStore, InventoryStore, Store};

/// Result of a committed purchase.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    /// Buyer account after the debit
    pub buyer: Account,
    /// Catalog price of one unit
    pub unit_price: i64,
    /// The updated or newly created inventory line
    pub line: InventoryLine,
}

/// Buy `quantity` units of `item_name` for `buyer`.
///
/// # Process
///
/// 1. Reject empty item names and non-positive quantities
/// 2. Open one unit of work
/// 3. Look up the unit price
/// 4. Lock the buyer's account row
/// 5. Check the balance against `price * quantity` under the lock
/// 6. Debit the buyer and upsert the (buyer, item) inventory line
/// 7. Commit (or roll back on any error)
///
/// # Errors
///
/// - `InvalidInput`: quantity below 1, empty item name, or cost overflow
/// - `ItemNotFound`: item name not in the catalog
/// - `AccountNotFound`: buyer username does not resolve
/// - `InsufficientFunds`: balance does not cover the cost
/// - `Conflict` / `Database`: storage failure, unit rolled back
pub async fn execute_purchase<S>(
    store: &S,
    buyer: &str,
    item_name: &str,
    quantity: i64,
) -> Result<PurchaseOutcome, AppError>
where
    S: AccountStore + InventoryStore + CatalogStore,
{
    // Validate inputs
    if item_name.is_empty() {
        return Err(AppError::InvalidInput("item name is required".to_string()));
    }
    if quantity < 1 {
        return Err(AppError::InvalidInput(
            "quantity must be at least 1".to_string(),
        ));
    }

    let mut tx = store.begin().await?;

    let Some(item) = store.fetch_item(&mut tx, item_name).await? else {
        store.rollback(tx).await?;
        return Err(AppError::ItemNotFound);
    };

    let Some(buyer_acc) = store.fetch_for_update(&mut tx, buyer).await? else {
        store.rollback(tx).await?;
        return Err(AppError::AccountNotFound);
    };

    let Some(cost) = item.price.checked_mul(quantity) else {
        store.rollback(tx).await?;
        return Err(AppError::InvalidInput(
            "purchase cost out of range".to_string(),
        ));
    };

    if buyer_acc.balance < cost {
        store.rollback(tx).await?;
        return Err(AppError::InsufficientFunds);
    }

    let buyer_after = store.apply_delta(&mut tx, buyer_acc.id, -cost).await?;
    let line = store
        .add_or_create(&mut tx, buyer_acc.id, item_name, quantity)
        .await?;

    store.commit(tx).await?;

    Ok(PurchaseOutcome {
        buyer: buyer_after,
        unit_price: item.price,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemStore;

    async fn balance_of(store: &MemStore, username: &str) -> i64 {
        let mut tx = store.begin().await.unwrap();
        store.fetch(&mut tx, username).await.unwrap().unwrap().balance
    }

    #[tokio::test]
    async fn purchase_debits_balance_and_credits_inventory() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_item("cup", 10).await;

        let outcome = execute_purchase(&store, "alice", "cup", 2).await.unwrap();

        assert_eq!(outcome.buyer.balance, 980);
        assert_eq!(outcome.unit_price, 10);
        assert_eq!(outcome.line.item_kind, "cup");
        assert_eq!(outcome.line.quantity, 2);
        assert_eq!(balance_of(&store, "alice").await, 980);
    }

    #[tokio::test]
    async fn repeat_purchases_grow_one_line() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_item("pen", 10).await;

        execute_purchase(&store, "alice", "pen", 5).await.unwrap();
        let outcome = execute_purchase(&store, "alice", "pen", 3).await.unwrap();

        assert_eq!(outcome.line.quantity, 8);
        assert_eq!(outcome.buyer.balance, 1000 - 10 * 8);

        let mut tx = store.begin().await.unwrap();
        let lines = store.lines_for_owner(&mut tx, outcome.buyer.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 8);
    }

    #[tokio::test]
    async fn unknown_item_is_rejected() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;

        let err = execute_purchase(&store, "alice", "spaceship", 1).await.unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound));
        assert_eq!(balance_of(&store, "alice").await, 1000);
    }

    #[tokio::test]
    async fn unknown_buyer_is_rejected() {
        let store = MemStore::new();
        store.seed_item("cup", 10).await;

        let err = execute_purchase(&store, "nobody", "cup", 1).await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));
    }

    #[tokio::test]
    async fn insufficient_funds_leaves_no_inventory() {
        let store = MemStore::new();
        let alice = store.seed_account("alice", "hash", 15).await;
        store.seed_item("cup", 10).await;

        let err = execute_purchase(&store, "alice", "cup", 2).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));

        assert_eq!(balance_of(&store, "alice").await, 15);
        let mut tx = store.begin().await.unwrap();
        assert!(store.fetch_line(&mut tx, alice.id, "cup").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_inputs_are_rejected() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_item("cup", 10).await;

        let err = execute_purchase(&store, "alice", "", 1).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = execute_purchase(&store, "alice", "cup", 0).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        assert_eq!(balance_of(&store, "alice").await, 1000);
    }

    #[tokio::test]
    async fn overflowing_cost_is_rejected() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_item("gold-bar", i64::MAX / 2).await;

        let err = execute_purchase(&store, "alice", "gold-bar", 3).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(balance_of(&store, "alice").await, 1000);
    }
}
