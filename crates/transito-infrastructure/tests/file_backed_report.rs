//! A full transit report against the JSON repositories and the memory store.

use std::sync::Arc;
use tempfile::TempDir;
use transito_core::catalog::{CatalogEntry, CatalogKey, CatalogRepository};
use transito_core::combo::{ComboAssignment, ComboRepository};
use transito_core::pin::PinSize;
use transito_core::session::{InboundEvent, SessionStateMachine, SessionStore, Token};
use transito_infrastructure::{
    AppConfig, JsonCatalogRepository, JsonComboRepository, MemorySessionStore,
};

const CHAT: i64 = 77;

#[tokio::test]
async fn report_reads_combo_and_catalog_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        data_dir: Some(temp_dir.path().to_path_buf()),
        ..AppConfig::default()
    };

    let catalog = Arc::new(JsonCatalogRepository::new(config.catalog_path()));
    let combos = Arc::new(JsonComboRepository::new(config.combo_path()));
    let store = Arc::new(MemorySessionStore::new());

    catalog
        .upsert(
            &CatalogKey::new("FND", "8oz", "FDA"),
            CatalogEntry::new("7401234", 12),
        )
        .await
        .unwrap();
    combos
        .assign(CHAT, "M1", ComboAssignment::new("FND", "8oz", "FDA"))
        .await
        .unwrap();

    let machine = SessionStateMachine::new(store.clone(), combos, catalog)
        .with_options(config.pipeline_options())
        .with_label_generator(config.label_generator());

    machine.start(CHAT).await.unwrap();
    let send = |token: Token| InboundEvent::token(CHAT, &token);

    let replies = machine.handle(&send(Token::Line("M1".into()))).await.unwrap();
    assert!(replies[0].text.contains("FND 8oz FDA"));

    machine.handle(&InboundEvent::text(CHAT, "4")).await.unwrap();
    let replies = machine.handle(&send(Token::Pin(PinSize::Small))).await.unwrap();
    assert!(replies[0].text.contains("BEST BY 15"));
    assert!(replies[0].text.contains("6173 7401234"));

    let replies = machine.handle(&send(Token::AddAnother(false))).await.unwrap();
    assert!(replies[0].text.ends_with("Boxes: 374"));
    assert_eq!(store.count().await.unwrap(), 0);

    assert!(config.catalog_path().exists());
    assert!(config.combo_path().exists());
}
