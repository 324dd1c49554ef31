use crate::catalog::CatalogKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The product/size/market currently running on a filling line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboAssignment {
    #[serde(alias = "producto")]
    pub product: String,
    #[serde(alias = "medida")]
    pub size: String,
    #[serde(alias = "mercado")]
    pub market: String,
}

impl ComboAssignment {
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

    pub fn catalog_key(&self) -> CatalogKey {
        CatalogKey::new(&self.product, &self.size, &self.market)
    }
}

impl fmt::Display for ComboAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.product, self.size, self.market)
    }
}
