//! Coin economy service: accounts, transfers, purchases, and the per-user
//! inventory behind them.
//!
//! The ledger core lives in [`services`] and runs against the store
//! contracts in [`store`]; everything else (routing, auth plumbing,
//! configuration, migrations) surrounds that core.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: bcrypt passwords + HS256 bearer tokens
//! - **Format**: JSON requests/responses

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use crate::{config::Config, store::postgres::PgStore};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Production store over the connection pool
    pub store: PgStore,

    /// Environment configuration (JWT secret, port, ...)
    pub config: Config,
}
