//! Transfer service - Core business logic for coin transfers.
//!
//! This service handles:
//! - Atomic balance updates for both parties
//! - Balance validation under the row locks
//! - Ledger entry recording
//!
//! # Atomicity Guarantees
//!
//! Both balance updates and the ledger append happen within one unit of
//! work. No partial transfer is ever observable by a concurrent reader.

use crate::error::AppError;
use crate::models::account::Account;
use crate::models::ledger::LedgerEntry;
use crate::store::{AccountStore, LedgerStore, Store};

/// Result of a committed transfer.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// Sender account after the transfer
    pub sender: Account,
    /// Recipient account after the transfer
    pub recipient: Account,
    /// The recorded ledger entry
    pub entry: LedgerEntry,
}

/// Move `amount` coins from `sender` to `recipient` and record the transfer.
///
/// # Process
///
/// 1. Reject non-positive amounts
/// 2. Open one unit of work
/// 3. Lock both account rows in ascending-username order
/// 4. Check the sender balance under the lock
/// 5. Apply both relative balance updates
/// 6. Append one ledger entry
/// 7. Commit (or roll back on any error)
///
/// Overlapping transfers always acquire their locks in the same global
/// order, so they serialize instead of deadlocking. Repeating a call with
/// identical arguments performs a second transfer; the operation is not
/// idempotent by design.
///
/// A transfer to oneself is permitted: the two updates net to zero on the
/// single locked row and the ledger entry is still recorded.
///
/// # Errors
///
/// - `InvalidInput`: amount below 1
/// - `AccountNotFound`: either username does not resolve
/// - `InsufficientFunds`: sender balance does not cover the amount
/// - `Conflict` / `Database`: storage failure, unit rolled back
pub async fn execute_transfer<S>(
    store: &S,
    sender: &str,
    recipient: &str,
    amount: i64,
) -> Result<TransferOutcome, AppError>
where
    S: AccountStore + LedgerStore,
{
    // Validate amount
    if amount < 1 {
        return Err(AppError::InvalidInput(
            "amount must be at least 1".to_string(),
        ));
    }

    let mut tx = store.begin().await?;

    // Lock both rows, lowest username first. A self-transfer locks its
    // single row exactly once.
    let (first, second) = if sender <= recipient {
        (sender, recipient)
    } else {
        (recipient, sender)
    };

    let first_acc = store.fetch_for_update(&mut tx, first).await?;
    let second_acc = if sender == recipient {
        first_acc.clone()
    } else {
        store.fetch_for_update(&mut tx, second).await?
    };

    let (Some(first_acc), Some(second_acc)) = (first_acc, second_acc) else {
        store.rollback(tx).await?;
        return Err(AppError::AccountNotFound);
    };

    let (sender_acc, recipient_acc) = if sender <= recipient {
        (first_acc, second_acc)
    } else {
        (second_acc, first_acc)
    };

    // The check and the updates below sit inside the same unit, so no
    // other writer can squeeze between them.
    if sender_acc.balance < amount {
        store.rollback(tx).await?;
        return Err(AppError::InsufficientFunds);
    }

    let sender_after = store.apply_delta(&mut tx, sender_acc.id, -amount).await?;
    let recipient_after = store.apply_delta(&mut tx, recipient_acc.id, amount).await?;
    // On a self-transfer the second update carries the final row state.
    let sender_after = if sender_acc.id == recipient_acc.id {
        recipient_after.clone()
    } else {
        sender_after
    };

    let entry = store
        .append(&mut tx, sender_acc.id, recipient_acc.id, amount)
        .await?;

    store.commit(tx).await?;

    Ok(TransferOutcome {
        sender: sender_after,
        recipient: recipient_after,
        entry,
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
    async fn transfer_moves_coins_and_records_entry() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_account("bob", "hash", 1200).await;

        let outcome = execute_transfer(&store, "alice", "bob", 100).await.unwrap();

        assert_eq!(outcome.sender.balance, 900);
        assert_eq!(outcome.recipient.balance, 1300);
        assert_eq!(outcome.entry.amount, 100);
        assert_eq!(outcome.entry.sender_id, outcome.sender.id);
        assert_eq!(outcome.entry.recipient_id, outcome.recipient.id);

        assert_eq!(balance_of(&store, "alice").await, 900);
        assert_eq!(balance_of(&store, "bob").await, 1300);
    }

    #[tokio::test]
    async fn transfer_conserves_total_balance() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 750).await;
        store.seed_account("bob", "hash", 250).await;

        execute_transfer(&store, "alice", "bob", 333).await.unwrap();

        let total = balance_of(&store, "alice").await + balance_of(&store, "bob").await;
        assert_eq!(total, 1000);
    }

    #[tokio::test]
    async fn insufficient_funds_leaves_everything_untouched() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_account("bob", "hash", 0).await;

        let err = execute_transfer(&store, "alice", "bob", 10000).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));

        assert_eq!(balance_of(&store, "alice").await, 1000);
        assert_eq!(balance_of(&store, "bob").await, 0);

        let mut tx = store.begin().await.unwrap();
        let alice = store.fetch(&mut tx, "alice").await.unwrap().unwrap();
        let sent = store.sent_totals(&mut tx, alice.id).await.unwrap();
        assert!(sent.is_empty());
    }

    #[tokio::test]
    async fn zero_and_negative_amounts_are_rejected() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_account("bob", "hash", 0).await;

        for amount in [0, -5] {
            let err = execute_transfer(&store, "alice", "bob", amount).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
        assert_eq!(balance_of(&store, "alice").await, 1000);
    }

    #[tokio::test]
    async fn unknown_accounts_are_rejected() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;

        let err = execute_transfer(&store, "alice", "nobody", 10).await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));

        let err = execute_transfer(&store, "nobody", "alice", 10).await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));

        assert_eq!(balance_of(&store, "alice").await, 1000);
    }

    #[tokio::test]
    async fn repeated_transfers_are_not_deduplicated() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 1000).await;
        store.seed_account("bob", "hash", 0).await;

        let first = execute_transfer(&store, "alice", "bob", 100).await.unwrap();
        let second = execute_transfer(&store, "alice", "bob", 100).await.unwrap();

        assert_ne!(first.entry.id, second.entry.id);
        assert_eq!(balance_of(&store, "alice").await, 800);
        assert_eq!(balance_of(&store, "bob").await, 200);
    }

    #[tokio::test]
    async fn self_transfer_keeps_balance_and_records_entry() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 500).await;

        let outcome = execute_transfer(&store, "alice", "alice", 50).await.unwrap();

        assert_eq!(outcome.sender.balance, 500);
        assert_eq!(outcome.recipient.balance, 500);
        assert_eq!(outcome.entry.amount, 50);
        assert_eq!(balance_of(&store, "alice").await, 500);
    }

    #[tokio::test]
    async fn self_transfer_still_requires_funds() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 30).await;

        let err = execute_transfer(&store, "alice", "alice", 50).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));
    }

    #[tokio::test]
    async fn concurrent_drains_of_one_sender_serialize() {
        let store = MemStore::new();
        store.seed_account("alice", "hash", 100).await;
        store.seed_account("bob", "hash", 0).await;
        store.seed_account("carol", "hash", 0).await;

        let s1 = store.clone();
        let s2 = store.clone();
        let first =
            tokio::spawn(async move { execute_transfer(&s1, "alice", "bob", 80).await });
        let second =
            tokio::spawn(async move { execute_transfer(&s2, "alice", "carol", 80).await });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();

        // The sender can only fund one of the two; the loser sees the
        // business rejection, never a negative balance.
        assert_eq!(succeeded, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::InsufficientFunds))));
        assert_eq!(balance_of(&store, "alice").await, 20);
        assert_eq!(
            balance_of(&store, "bob").await + balance_of(&store, "carol").await,
            80
        );
    }
}
