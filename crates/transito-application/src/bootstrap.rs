//! Wires the concrete stack described by an [`AppConfig`].

use crate::dialogue::DialogueService;
use std::sync::Arc;
use tracing::debug;
use transito_core::session::SessionStateMachine;
use transito_infrastructure::{
    AppConfig, JsonCatalogRepository, JsonComboRepository, MemorySessionStore,
};

/// Shared services of a running bot.
pub struct AppContext {
    pub catalog: Arc<JsonCatalogRepository>,
    pub combos: Arc<JsonComboRepository>,
    pub machine: Arc<SessionStateMachine>,
    pub dialogue: Arc<DialogueService>,
}

impl AppContext {
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = Arc::new(JsonCatalogRepository::new(config.catalog_path()));
        let combos = Arc::new(JsonComboRepository::new(config.combo_path()));
        debug!(
            catalog = %catalog.path().display(),
            combos = %combos.path().display(),
            "Using data files"
        );

        let machine = Arc::new(
            SessionStateMachine::new(
                Arc::new(MemorySessionStore::new()),
                combos.clone(),
                catalog.clone(),
            )
            .with_roster(config.lines.clone())
            .with_menus(config.menus())
            .with_label_generator(config.label_generator())
            .with_options(config.pipeline_options()),
        );
        let dialogue = Arc::new(DialogueService::new(
            machine.clone(),
            combos.clone(),
            catalog.clone(),
        ));

        Self {
            catalog,
            combos,
            machine,
            dialogue,
        }
    }
}
