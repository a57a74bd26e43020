//! Business logic services.
//!
//! Services contain the ledger core separated from HTTP handlers. Each call
//! performs exactly one atomic unit of work against the store contracts and
//! returns a plain outcome or a typed failure. All functions are generic
//! over the store capabilities they actually need, so they run unchanged
//! against Postgres and the in-memory backend.

pub mod account_service;
pub mod purchase_service;
pub mod query_service;
pub mod transfer_service;
