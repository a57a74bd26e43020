//! PostgreSQL store backend.
//!
//! All SQL for the four entity families lives here. A unit of work is a
//! sqlx transaction; row locks are taken with `SELECT ... FOR UPDATE` and
//! held until commit or rollback.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::account::Account;
use crate::models::catalog::CatalogItem;
use crate::models::inventory::InventoryLine;
use crate::models::ledger::{CounterpartyTotal, LedgerEntry};
use crate::store::{AccountStore, CatalogStore, InventoryStore, LedgerStore, Store};

/// Production store backed by the connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for plumbing that runs outside a unit of work
    /// (health checks).
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map driver errors into the application taxonomy.
///
/// Serialization failures (40001) and deadlocks (40P01) become `Conflict`
/// so callers can tell a retryable collision from a plain storage failure.
fn db_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if matches!(db.code().as_deref(), Some("40001") | Some("40P01")) {
            return AppError::Conflict;
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, AppError> {
        self.pool.begin().await.map_err(db_err)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), AppError> {
        tx.commit().await.map_err(db_err)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), AppError> {
        tx.rollback().await.map_err(db_err)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_if_absent(
        &self,
        tx: &mut Self::Tx,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, AppError> {
        // ON CONFLICT DO NOTHING returns no row when the username already
        // exists; fall through to a plain fetch of the surviving row.
        let inserted = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?;

        match inserted {
            Some(account) => Ok(account),
            None => sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
                .bind(username)
                .fetch_one(&mut **tx)
                .await
                .map_err(db_err),
        }
    }

    async fn fetch(&self, tx: &mut Self::Tx, username: &str) -> Result<Option<Account>, AppError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_err)
    }

    async fn fetch_for_update(
        &self,
        tx: &mut Self::Tx,
        username: &str,
    ) -> Result<Option<Account>, AppError> {
        // FOR UPDATE holds the row lock until the enclosing transaction
        // ends; a second FOR UPDATE on the same row in the same transaction
        // simply re-acquires the lock it already holds.
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1 FOR UPDATE")
            .bind(username)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_err)
    }

    async fn apply_delta(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        delta: i64,
    ) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET balance = balance + $1,
                updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(delta)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err)
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn append(
        &self,
        tx: &mut Self::Tx,
        sender_id: Uuid,
        recipient_id: Uuid,
        amount: i64,
    ) -> Result<LedgerEntry, AppError> {
        sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (sender_id, recipient_id, amount)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(amount)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err)
    }

    async fn sent_totals(
        &self,
        tx: &mut Self::Tx,
        sender_id: Uuid,
    ) -> Result<Vec<CounterpartyTotal>, AppError> {
        sqlx::query_as::<_, CounterpartyTotal>(
            r#"
            SELECT a.username AS counterparty, SUM(l.amount)::BIGINT AS total
            FROM ledger_entries l
            JOIN accounts a ON a.id = l.recipient_id
            WHERE l.sender_id = $1
            GROUP BY a.username
            ORDER BY a.username
            "#,
        )
        .bind(sender_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(db_err)
    }

    async fn received_totals(
        &self,
        tx: &mut Self::Tx,
        recipient_id: Uuid,
    ) -> Result<Vec<CounterpartyTotal>, AppError> {
        sqlx::query_as::<_, CounterpartyTotal>(
            r#"
            SELECT a.username AS counterparty, SUM(l.amount)::BIGINT AS total
            FROM ledger_entries l
            JOIN accounts a ON a.id = l.sender_id
            WHERE l.recipient_id = $1
            GROUP BY a.username
            ORDER BY a.username
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(db_err)
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn fetch_line(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
        item_kind: &str,
    ) -> Result<Option<InventoryLine>, AppError> {
        sqlx::query_as::<_, InventoryLine>(
            "SELECT * FROM inventory_lines WHERE owner_id = $1 AND item_kind = $2",
        )
        .bind(owner_id)
        .bind(item_kind)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)
    }

    async fn add_or_create(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
        item_kind: &str,
        quantity: i64,
    ) -> Result<InventoryLine, AppError> {
        // One upsert keeps create and increment a single conceptual
        // operation inside the enclosing unit of work.
        sqlx::query_as::<_, InventoryLine>(
            r#"
            INSERT INTO inventory_lines (owner_id, item_kind, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner_id, item_kind)
            DO UPDATE SET quantity = inventory_lines.quantity + EXCLUDED.quantity
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(item_kind)
        .bind(quantity)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err)
    }

    async fn lines_for_owner(
        &self,
        tx: &mut Self::Tx,
        owner_id: Uuid,
    ) -> Result<Vec<InventoryLine>, AppError> {
        sqlx::query_as::<_, InventoryLine>(
            "SELECT * FROM inventory_lines WHERE owner_id = $1 ORDER BY item_kind",
        )
        .bind(owner_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(db_err)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn fetch_item(
        &self,
        tx: &mut Self::Tx,
        name: &str,
    ) -> Result<Option<CatalogItem>, AppError> {
        sqlx::query_as::<_, CatalogItem>("SELECT * FROM catalog_items WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_err)
    }
}
