use anyhow::{Context, Result};
use transito_core::catalog::{CatalogEntry, CatalogKey, CatalogRepository};
use transito_infrastructure::{AppConfig, JsonCatalogRepository};

fn repository(config: &AppConfig) -> JsonCatalogRepository {
    JsonCatalogRepository::new(config.catalog_path())
}

pub async fn list(config: &AppConfig) -> Result<()> {
    let repo = repository(config);
    let entries = repo.list_all().await?;

    if entries.is_empty() {
        println!("Catalog {} is empty.", repo.path().display());
        return Ok(());
    }

    for (key, entry) in entries {
        match entry.complete() {
            Some(complete) => println!(
                "{key}\tSKU {}\t{} months",
                complete.sku, complete.shelf_life_months
            ),
            None => println!("{key}\tmissing: {}", entry.missing_fields().join(", ")),
        }
    }

    Ok(())
}

pub async fn set(config: &AppConfig, key: &str, sku: String, shelf_life: u32) -> Result<()> {
    let key = CatalogKey::parse(key)
        .with_context(|| format!("Invalid catalog key {key:?}, expected product|size|market"))?;
    let repo = repository(config);

    repo.upsert(&key, CatalogEntry::new(sku, shelf_life)).await?;
    println!("Saved {key} to {}", repo.path().display());

    Ok(())
}
