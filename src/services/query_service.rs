//! Query service - Read-only aggregation of a user's state.
//!
//! Composes the account row, the inventory lines, and the two grouped
//! ledger aggregates into one view. No side effects; consistency is
//! whatever one read-only unit of work gives on the underlying store.

use crate::error::AppError;
use crate::models::account::Account;
use crate::models::inventory::InventoryLine;
use crate::models::ledger::CounterpartyTotal;
use crate::store::{AccountStore, InventoryStore, LedgerStore, Store};

/// Aggregated view of one user's balance, inventory and transfer history.
#[derive(Debug, Clone)]
pub struct UserView {
    pub account: Account,
    pub inventory: Vec<InventoryLine>,
    /// Coins sent, summed per recipient
    pub sent: Vec<CounterpartyTotal>,
    /// Coins received, summed per sender
    pub received: Vec<CounterpartyTotal>,
}

/// Assemble the view for `username`.
///
/// # Errors
///
/// - `AccountNotFound`: username does not resolve
/// - `Conflict` / `Database`: storage failure
pub async fn get_user_view<S>(store: &S, username: &str) -> Result<UserView, AppError>
where
    S: AccountStore + LedgerStore + InventoryStore,
{
    let mut tx = store.begin().await?;

    let Some(account) = store.fetch(&mut tx, username).await? else {
        store.rollback(tx).await?;
        return Err(AppError::AccountNotFound);
    };

    let inventory = store.lines_for_owner(&mut tx, account.id).await?;
    let sent = store.sent_totals(&mut tx, account.id).await?;
    let received = store.received_totals(&mut tx, account.id).await?;

    store.commit(tx).await?;

    Ok(UserView {
        account,
        inventory,
        sent,
        received,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::purchase_service::execute_purchase;
    use crate::services::transfer_service::execute_transfer;
    use crate::store::memory::MemStore;

    #[tokio::test]
    async fn view_groups_transfers_by_counterparty() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_account("bob", "hash", 1000).await;
        store.seed_account("carol", "hash", 1000).await;

        execute_transfer(&store, "alice", "bob", 50).await.unwrap();
        execute_transfer(&store, "alice", "bob", 30).await.unwrap();
        execute_transfer(&store, "alice", "carol", 20).await.unwrap();
        execute_transfer(&store, "carol", "alice", 10).await.unwrap();

        let view = get_user_view(&store, "alice").await.unwrap();

        assert_eq!(view.account.balance, 1000 - 50 - 30 - 20 + 10);
        assert_eq!(
            view.sent,
            vec![
                CounterpartyTotal { counterparty: "bob".to_string(), total: 80 },
                CounterpartyTotal { counterparty: "carol".to_string(), total: 20 },
            ]
        );
        assert_eq!(
            view.received,
            vec![CounterpartyTotal { counterparty: "carol".to_string(), total: 10 }]
        );
    }

    #[tokio::test]
    async fn view_includes_inventory_lines() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_item("cup", 20).await;
        store.seed_item("book", 50).await;

        execute_purchase(&store, "alice", "cup", 2).await.unwrap();
        execute_purchase(&store, "alice", "book", 1).await.unwrap();

        let view = get_user_view(&store, "alice").await.unwrap();

        assert_eq!(view.inventory.len(), 2);
        // ordered by item kind
        assert_eq!(view.inventory[0].item_kind, "book");
        assert_eq!(view.inventory[1].item_kind, "cup");
    }

    #[tokio::test]
    async fn fresh_account_has_empty_view() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 0).await;

        let view = get_user_view(&store, "alice").await.unwrap();

        assert!(view.inventory.is_empty());
        assert!(view.sent.is_empty());
        assert!(view.received.is_empty());
    }

    #[tokio::test]
    async fn unknown_account_is_rejected() {
        let store = MemStore::new();

        let err = get_user_view(&store, "nobody").await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));
    }
}
