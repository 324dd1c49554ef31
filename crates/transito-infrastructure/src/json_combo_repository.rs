//! JSON-file backed combo registry.

use crate::storage::{AtomicJsonFile, run_blocking};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use transito_core::Result;
use transito_core::combo::{ComboAssignment, ComboRegistry, ComboRepository};
use transito_core::session::ChatId;

/// `{ "<chat_id>": { "<line>": { "product": .., "size": .., "market": .. } } }`
///
/// Rows are kept as raw JSON so one hand-edited, incomplete entry does not make
/// the rest of the file unreadable. Such entries read as "no combo".
type ComboDocument = BTreeMap<String, BTreeMap<String, Value>>;

#[derive(Clone)]
pub struct JsonComboRepository {
    file: AtomicJsonFile<ComboDocument>,
}

impl JsonComboRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn load_chat(&self, chat_id: ChatId) -> Result<BTreeMap<String, Value>> {
        let file = self.file.clone();
        let mut document = run_blocking(move || Ok(file.load()?.unwrap_or_default())).await?;
        Ok(document.remove(&chat_id.to_string()).unwrap_or_default())
    }

    fn decode(chat_id: ChatId, line: &str, raw: Value) -> Option<ComboAssignment> {
        match serde_json::from_value(raw) {
            Ok(combo) => Some(combo),
            Err(e) => {
                warn!(chat_id, line, error = %e, "Ignoring incomplete combo entry");
                None
            }
        }
    }
}

#[async_trait]
impl ComboRegistry for JsonComboRepository {
    async fn find(&self, chat_id: ChatId, line: &str) -> Result<Option<ComboAssignment>> {
        let mut lines = self.load_chat(chat_id).await?;
        Ok(lines
            .remove(line)
            .and_then(|raw| Self::decode(chat_id, line, raw)))
    }

    async fn list_for_chat(&self, chat_id: ChatId) -> Result<BTreeMap<String, ComboAssignment>> {
        let lines = self.load_chat(chat_id).await?;
        Ok(lines
            .into_iter()
            .filter_map(|(line, raw)| Self::decode(chat_id, &line, raw).map(|combo| (line, combo)))
            .collect())
    }
}

#[async_trait]
impl ComboRepository for JsonComboRepository {
    async fn assign(&self, chat_id: ChatId, line: &str, combo: ComboAssignment) -> Result<()> {
        let file = self.file.clone();
        let line = line.to_string();
        let value = serde_json::to_value(&combo)?;
        run_blocking(move || {
            file.update(ComboDocument::new(), |document| {
                document
                    .entry(chat_id.to_string())
                    .or_default()
                    .insert(line, value);
            })?;
            Ok(())
        })
        .await
    }
}
