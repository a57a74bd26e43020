//! Catalog item model.
//!
//! Catalog items are seeded once by migration and read-only afterwards.

use serde::Serialize;

/// Represents a purchasable item from the `catalog_items` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct CatalogItem {
    /// Unique item name
    pub name: String,

    /// Price of one unit in coins, always positive
    pub price: i64,
}
