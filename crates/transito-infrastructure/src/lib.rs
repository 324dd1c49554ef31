//! File and memory backed implementations of the transito core traits.

pub mod config;
pub mod json_catalog_repository;
pub mod json_combo_repository;
pub mod memory_session_store;
pub mod paths;
pub mod storage;

pub use crate::config::AppConfig;
pub use crate::json_catalog_repository::JsonCatalogRepository;
pub use crate::json_combo_repository::JsonComboRepository;
pub use crate::memory_session_store::MemorySessionStore;
pub use crate::paths::TransitoPaths;
