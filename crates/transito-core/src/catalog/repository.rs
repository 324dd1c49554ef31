//! Catalog access traits.

use super::model::{CatalogEntry, CatalogKey};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Read-only catalog access used while handling dialogue events.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Finds the entry for `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))`: A row exists (it may still be incomplete)
    /// - `Ok(None)`: No row for this combination
    /// - `Err(_)`: The catalog could not be read
    async fn find(&self, key: &CatalogKey) -> Result<Option<CatalogEntry>>;
}

/// Catalog maintenance, used by the CLI.
#[async_trait]
pub trait CatalogRepository: CatalogLookup {
    async fn list_all(&self) -> Result<BTreeMap<CatalogKey, CatalogEntry>>;

    /// Inserts or replaces the row for `key`.
    async fn upsert(&self, key: &CatalogKey, entry: CatalogEntry) -> Result<()>;
}
