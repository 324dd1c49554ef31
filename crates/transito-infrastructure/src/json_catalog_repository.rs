//! JSON-file backed SKU catalog.

use crate::storage::{AtomicJsonFile, run_blocking};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use transito_core::Result;
use transito_core::catalog::{CatalogEntry, CatalogKey, CatalogLookup, CatalogRepository};

/// Rows are kept as raw JSON and decoded one by one, so a hand-edited row with
/// odd types degrades to an incomplete entry instead of breaking every lookup.
type CatalogDocument = BTreeMap<String, Value>;

const SHELF_LIFE_FIELDS: [&str; 2] = ["shelf_life_months", "vida_util_meses"];

/// Catalog stored as `{ "product|size|market": { "sku": ..., "shelf_life_months": ... } }`.
///
/// The file is re-read on every lookup so edits made while the bot runs are
/// picked up without a restart.
#[derive(Clone)]
pub struct JsonCatalogRepository {
    file: AtomicJsonFile<CatalogDocument>,
}

impl JsonCatalogRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn load(&self) -> Result<CatalogDocument> {
        let file = self.file.clone();
        run_blocking(move || Ok(file.load()?.unwrap_or_default())).await
    }

    /// Decodes one row. SKUs may be numbers; shelf life may be a numeric string.
    /// Anything else leaves the field empty so it shows up as missing.
    fn decode(key: &str, raw: &Value) -> CatalogEntry {
        let Some(row) = raw.as_object() else {
            warn!(key, "Catalog row is not an object");
            return CatalogEntry::default();
        };

        let sku = match row.get("sku") {
            None | Some(Value::Null) => None,
            Some(Value::String(sku)) => Some(sku.trim().to_string()),
            Some(Value::Number(sku)) => Some(sku.to_string()),
            Some(other) => {
                warn!(key, value = %other, "Ignoring unreadable catalog SKU");
                None
            }
        };

        let shelf_life = SHELF_LIFE_FIELDS
            .iter()
            .find_map(|field| row.get(*field).filter(|v| !v.is_null()));
        let shelf_life_months = match shelf_life {
            None => None,
            Some(value) => {
                let months = match value {
                    Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
                    Value::String(s) => s.trim().parse::<u32>().ok(),
                    _ => None,
                };
                if months.is_none() {
                    warn!(key, value = %value, "Ignoring unreadable catalog shelf life");
                }
                months
            }
        };

        CatalogEntry {
            sku,
            shelf_life_months,
        }
    }
}

#[async_trait]
impl CatalogLookup for JsonCatalogRepository {
    async fn find(&self, key: &CatalogKey) -> Result<Option<CatalogEntry>> {
        let raw_key = key.to_string();
        let document = self.load().await?;
        Ok(document
            .get(&raw_key)
            .map(|raw| Self::decode(&raw_key, raw)))
    }
}

#[async_trait]
impl CatalogRepository for JsonCatalogRepository {
    async fn list_all(&self) -> Result<BTreeMap<CatalogKey, CatalogEntry>> {
        let document = self.load().await?;
        let mut entries = BTreeMap::new();
        for (raw_key, raw) in document {
            match CatalogKey::parse(&raw_key) {
                Some(key) => {
                    entries.insert(key, Self::decode(&raw_key, &raw));
                }
                None => warn!(key = %raw_key, path = %self.path().display(), "Skipping malformed catalog key"),
            }
        }
        Ok(entries)
    }

    async fn upsert(&self, key: &CatalogKey, entry: CatalogEntry) -> Result<()> {
        let file = self.file.clone();
        let key = key.to_string();
        let value = serde_json::to_value(&entry)?;
        run_blocking(move || {
            file.update(CatalogDocument::new(), |document| {
                document.insert(key, value);
            })?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_legacy_field_names_and_skips_bad_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalogo_skus.json");
        std::fs::write(
            &path,
            r#"{
                "FND|8oz|RTCA": { "sku": "7401234", "vida_util_meses": 18 },
                "FRD|28oz|FDA": { "sku": "" },
                "broken": { "sku": "1" }
            }"#,
        )
        .unwrap();
        let repo = JsonCatalogRepository::new(path);

        let entry = repo
            .find(&CatalogKey::new("FND", "8oz", "RTCA"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.shelf_life_months, Some(18));

        let incomplete = repo
            .find(&CatalogKey::new("FRD", "28oz", "FDA"))
            .await
            .unwrap()
            .unwrap();
        assert!(incomplete.complete().is_none());

        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn upsert_creates_file_and_replaces_rows() {
        let temp_dir = TempDir::new().unwrap();
        let repo = JsonCatalogRepository::new(temp_dir.path().join("catalog.json"));
        let key = CatalogKey::new("FNA", "14oz", "RTCA");

        assert!(repo.find(&key).await.unwrap().is_none());
        repo.upsert(&key, CatalogEntry::new("1", 6)).await.unwrap();
        repo.upsert(&key, CatalogEntry::new("2", 9)).await.unwrap();

        let stored = repo.find(&key).await.unwrap().unwrap();
        assert_eq!(stored, CatalogEntry::new("2", 9));

        let raw = std::fs::read_to_string(repo.path()).unwrap();
        assert!(raw.contains("\"FNA|14oz|RTCA\""));
        assert!(raw.contains("\"shelf_life_months\": 9"));
    }

    #[tokio::test]
    async fn odd_rows_do_not_break_other_lookups() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalogo_skus.json");
        std::fs::write(
            &path,
            r#"{
                "FND|8oz|RTCA": { "sku": "7401234", "shelf_life_months": 12 },
                "FRD|28oz|FDA": { "sku": 7409999, "vida_util_meses": "24" },
                "FRS|14oz|FDA": { "sku": ["x"], "vida_util_meses": "two years" },
                "FNA|4oz|RTCA": "7401"
            }"#,
        )
        .unwrap();
        let repo = JsonCatalogRepository::new(path);

        let good = repo
            .find(&CatalogKey::new("FND", "8oz", "RTCA"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(good, CatalogEntry::new("7401234", 12));

        let numeric = repo
            .find(&CatalogKey::new("FRD", "28oz", "FDA"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(numeric, CatalogEntry::new("7409999", 24));

        let garbled = repo
            .find(&CatalogKey::new("FRS", "14oz", "FDA"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(garbled.missing_fields(), vec!["SKU", "shelf life"]);

        let not_a_row = repo
            .find(&CatalogKey::new("FNA", "4oz", "RTCA"))
            .await
            .unwrap()
            .unwrap();
        assert!(not_a_row.complete().is_none());

        assert_eq!(repo.list_all().await.unwrap().len(), 4);
    }
}
