//! SKU catalog: what the plant knows about each product/size/market combination.

mod model;
mod repository;

pub use model::{CatalogEntry, CatalogKey, CompleteEntry};
pub use repository::{CatalogLookup, CatalogRepository};
