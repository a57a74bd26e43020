//! In-memory store backend.
//!
//! Intended for tests and local bring-up; not optimized for performance.
//!
//! A unit of work takes the store-wide async mutex and works on a copy of
//! the state: `commit` writes the copy back, `rollback` (or dropping the
//! unit) discards it. Holding the guard for the lifetime of the unit
//! serializes concurrent units the way row locks do in Postgres, so the
//! services' balance-check-then-write sequences behave the same way here.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::Account;
use crate::models::catalog::CatalogItem;
use crate::models::inventory::InventoryLine;
use crate::models::ledger::{CounterpartyTotal, LedgerEntry};
use crate::store::{AccountStore, CatalogStore, InventoryStore, LedgerStore, Store};

#[derive(Debug, Clone, Default)]
struct MemState {
    accounts: HashMap<Uuid, Account>,
    ledger: Vec<LedgerEntry>,
    last_entry_id: i64,
    inventory: HashMap<(Uuid, String), i64>,
    catalog: HashMap<String, i64>,
}

impl MemState {
    fn account_by_username(&self, username: &str) -> Option<Account> {
        self.accounts.values().find(|a| a.username == username).cloned()
    }
}

/// In-memory twin of [`super::postgres::PgStore`].
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    state: Arc<Mutex<MemState>>,
}

/// One open unit of work: the store-wide guard plus a working copy.
pub struct MemTx {
    guard: OwnedMutexGuard<MemState>,
    work: MemState,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account directly, bypassing registration. Test seeding.
    pub async fn seed_account(&self, username: &str, password_hash: &str, balance: i64) -> Account {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            balance,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.lock().await;
        state.accounts.insert(account.id, account.clone());
        account
    }

    /// Insert a catalog item directly. Test seeding.
    pub async fn seed_item(&self, name: &str, price: i64) {
        self.state.lock().await.catalog.insert(name.to_string(), price);
    }
}

#[async_trait]
impl Store for MemStore {
    type Tx = MemTx;

    async fn begin(&self) -> Result<Self::Tx, AppError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(MemTx { guard, work })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), AppError> {
        let MemTx { mut guard, work } = tx;
        *guard = work;
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), AppError> {
        drop(tx);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemStore {
    async fn create_if_absent(
        &self,
        tx: &mut Self::Tx,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, AppError> {
        if let Some(existing) = tx.work.account_by_username(username) {
            return Ok(existing);
        }
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            balance: 0,
            created_at: now,
            updated_at: now,
        };
        tx.work.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn fetch(&self, tx: &mut Self::Tx, username: &str) -> Result<Option<Account>, AppError> {
        Ok(tx.work.account_by_username(username))
    }

    async fn fetch_for_update(
        &self,
        tx: &mut Self::Tx,
        username: &str,
    ) -> Result<Option<Account>, AppError> {
        // The store-wide guard held by the unit already excludes every
        // other writer, so locking is a plain fetch here.
        Ok(tx.work.account_by_username(username))
    }

    async fn apply_delta(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        delta: i64,
    ) -> Result<Account, AppError> {
        let account = tx.work.accounts.get_mut(&id).ok_or(AppError::AccountNotFound)?;
        account.balance += delta;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }
}

#[async_trait]
impl LedgerStore for MemStore {
    async fn append(
        &self,
        tx: &mut Self::Tx,
        sender_id: Uuid,
        recipient_id: Uuid,
        amount: i64,
    ) -> Result<LedgerEntry, AppError> {
        tx.work.last_entry_id += 1;
        let entry = LedgerEntry {
            id: tx.work.last_entry_id,
            sender_id,
            recipient_id,
            amount,
            created_at: Utc::now(),
        };
        tx.work.ledger.push(entry.clone());
        Ok(entry)
    }

    async fn sent_totals(
        &self,
        tx: &mut Self::Tx,
        sender_id: Uuid,
    ) -> Result<Vec<CounterpartyTotal>, AppError> {
        let mut totals = BTreeMap::new();
        for entry in tx.work.ledger.iter().filter(|e| e.sender_id == sender_id) {
            let Some(recipient) = tx.work.accounts.get(&entry.recipient_id) else {
                continue;
            };
            *totals.entry(recipient.username.clone()).or_insert(0) += entry.amount;
        }
        Ok(totals
            .into_iter()
            .map(|(counterparty, total)| CounterpartyTotal { counterparty, total })
            .collect())
    }

    async fn received_totals(
        &self,
        tx: &mut Self::Tx,
        recipient_id: Uuid,
    ) -> Result<Vec<CounterpartyTotal>, AppError> {
        let mut totals = BTreeMap::new();
        for entry in tx.work.ledger.iter().filter(|e| e.recipient_id == recipient_id) {
            let Some(sender) = tx.work.accounts.get(&entry.sender_id) else {
                continue;
            };
            *totals.entry(sender.username.clone()).or_insert(0) += entry.amount;
        }
        Ok(totals
            .into_iter()
            .map(|(counterparty, total)| CounterpartyTotal { counterparty, total })
            .collect())
    }
}

#[async_trait]
impl InventoryStore for MemStore {
    async fn fetch_line(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
        item_kind: &str,
    ) -> Result<Option<InventoryLine>, AppError> {
        Ok(tx
            .work
            .inventory
            .get(&(owner_id, item_kind.to_string()))
            .map(|&quantity| InventoryLine {
                owner_id,
                item_kind: item_kind.to_string(),
                quantity,
            }))
    }

    async fn add_or_create(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
        item_kind: &str,
        quantity: i64,
    ) -> Result<InventoryLine, AppError> {
        let slot = tx
            .work
            .inventory
            .entry((owner_id, item_kind.to_string()))
            .or_insert(0);
        *slot += quantity;
        Ok(InventoryLine {
            owner_id,
            item_kind: item_kind.to_string(),
            quantity: *slot,
        })
    }

    async fn lines_for_owner(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
    ) -> Result<Vec<InventoryLine>, AppError> {
        let mut lines: Vec<InventoryLine> = tx
            .work
            .inventory
            .iter()
            .filter(|((owner, _), _)| *owner == owner_id)
            .map(|((_, item_kind), &quantity)| InventoryLine {
                owner_id,
                item_kind: item_kind.clone(),
                quantity,
            })
            .collect();
        lines.sort_by(|a, b| a.item_kind.cmp(&b.item_kind));
        Ok(lines)
    }
}

#[async_trait]
impl CatalogStore for MemStore {
    async fn fetch_item(
        &self,
        tx: &mut Self::Tx,
        name: &str,
    ) -> Result<Option<CatalogItem>, AppError> {
        Ok(tx.work.catalog.get(name).map(|&price| CatalogItem {
            name: name.to_string(),
            price,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_publishes_writes() {
        let store = MemStore::new();
        let mut tx = store.begin().await.unwrap();
        let account = store.create_if_absent(&mut tx, "alice", "hash").await.unwrap();
        store.commit(tx).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let fetched = store.fetch(&mut tx, "alice").await.unwrap().unwrap();
        store.rollback(tx).await.unwrap();

        assert_eq!(fetched.id, account.id);
        assert_eq!(fetched.balance, 0);
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let store = MemStore::new();
        let mut tx = store.begin().await.unwrap();
        store.create_if_absent(&mut tx, "alice", "hash").await.unwrap();
        store.rollback(tx).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(store.fetch(&mut tx, "alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dropped_unit_leaves_no_partial_writes() {
        let store = MemStore::new();
        let account = store.seed_account("alice", "hash", 100).await;

        {
            let mut tx = store.begin().await.unwrap();
            store.apply_delta(&mut tx, account.id, -40).await.unwrap();
            // dropped without commit
        }

        let mut tx = store.begin().await.unwrap();
        let fetched = store.fetch(&mut tx, "alice").await.unwrap().unwrap();
        assert_eq!(fetched.balance, 100);
    }

    #[tokio::test]
    async fn upsert_keeps_one_line_per_pair() {
        let store = MemStore::new();
        let account = store.seed_account("alice", "hash", 0).await;

        let mut tx = store.begin().await.unwrap();
        store.add_or_create(&mut tx, account.id, "cup", 5).await.unwrap();
        let line = store.add_or_create(&mut tx, account.id, "cup", 3).await.unwrap();
        assert_eq!(line.quantity, 8);

        let lines = store.lines_for_owner(&mut tx, account.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 8);
    }

    #[tokio::test]
    async fn ledger_ids_are_monotonic() {
        let store = MemStore::new();
        let a = store.seed_account("alice", "hash", 0).await;
        let b = store.seed_account("bob", "hash", 0).await;

        let mut tx = store.begin().await.unwrap();
        let first = store.append(&mut tx, a.id, b.id, 10).await.unwrap();
        let second = store.append(&mut tx, b.id, a.id, 20).await.unwrap();
        store.commit(tx).await.unwrap();

        assert!(second.id > first.id);
    }
}
