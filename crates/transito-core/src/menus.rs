//! Choices offered when the operator picks products, sizes and markets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menus {
    pub products: Vec<String>,
    pub sizes: Vec<String>,
    pub markets: Vec<String>,
}

impl Default for Menus {
    fn default() -> Self {
        let owned =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            products: owned(&["FND", "FRD", "FRS", "FNA", "FNP", "FRP", "FNE", "FRE"]),
            sizes: owned(&["4oz", "8oz", "14oz", "16oz", "28oz", "35oz", "40oz", "80oz", "4lbs"]),
            markets: owned(&["RTCA", "FDA"]),
        }
    }
}
