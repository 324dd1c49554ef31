use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a catalog row. Rendered as `product|size|market` in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogKey {
    pub product: String,
    pub size: String,
    pub market: String,
}

impl CatalogKey {
    pub fn new(
        product: impl Into<String>,
        size: impl Into<String>,
        market: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            size: size.into(),
            market: market.into(),
        }
    }

    /// Parses the `product|size|market` storage form.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split('|');
        let key = Self::new(parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        Some(key)
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.product, self.size, self.market)
    }
}

/// A catalog row as stored. Either field may be missing in hand-edited files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(
        default,
        alias = "vida_util_meses",
        skip_serializing_if = "Option::is_none"
    )]
    pub shelf_life_months: Option<u32>,
}

/// A catalog row with every field needed to print a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteEntry {
    pub sku: String,
    pub shelf_life_months: u32,
}

impl CatalogEntry {
    pub fn new(sku: impl Into<String>, shelf_life_months: u32) -> Self {
        Self {
            sku: Some(sku.into()),
            shelf_life_months: Some(shelf_life_months),
        }
    }

    /// Returns the entry only when both fields are present and meaningful.
    pub fn complete(&self) -> Option<CompleteEntry> {
        let sku = self.sku.as_deref().filter(|s| !s.trim().is_empty())?;
        let shelf_life_months = self.shelf_life_months.filter(|m| *m > 0)?;
        Some(CompleteEntry {
            sku: sku.to_string(),
            shelf_life_months,
        })
    }

    /// Human names of the fields still missing, for operator messages.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sku.as_deref().is_none_or(|s| s.trim().is_empty()) {
            missing.push("SKU");
        }
        if self.shelf_life_months.is_none_or(|m| m == 0) {
            missing.push("shelf life");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trips_through_storage_form() {
        let key = CatalogKey::new("FND", "8oz", "FDA");
        assert_eq!(key.to_string(), "FND|8oz|FDA");
        assert_eq!(CatalogKey::parse("FND|8oz|FDA"), Some(key));
        assert_eq!(CatalogKey::parse("FND|8oz"), None);
        assert_eq!(CatalogKey::parse("a|b|c|d"), None);
    }

    #[test]
    fn legacy_shelf_life_field_is_accepted() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"sku": "7401", "vida_util_meses": 24}"#).unwrap();
        assert_eq!(entry.complete().unwrap().shelf_life_months, 24);
    }

    #[test]
    fn incomplete_entries_report_missing_fields() {
        let entry = CatalogEntry {
            sku: Some("  ".to_string()),
            shelf_life_months: None,
        };
        assert!(entry.complete().is_none());
        assert_eq!(entry.missing_fields(), vec!["SKU", "shelf life"]);
        assert!(CatalogEntry::new("1", 12).missing_fields().is_empty());
    }
}
