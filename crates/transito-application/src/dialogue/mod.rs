//! Dialogue routing: main menu, combo setup and the transit report.
//!
//! Commands, menu navigation and the setup flow are handled here. Everything
//! that belongs to a transit report is forwarded to [`SessionStateMachine`].
//! A chat runs one flow at a time: opening the setup flow cancels its transit
//! session and starting a report drops its setup draft.

mod setup;
mod views;

use setup::{SetupDraft, SetupStage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use transito_core::Result;
use transito_core::catalog::{CatalogEntry, CatalogLookup};
use transito_core::combo::{ComboAssignment, ComboRepository};
use transito_core::session::{
    ChatId, ChatLocks, InboundEvent, InboundKind, LabelOutcome, OutboundMessage,
    SessionStateMachine, Token,
};
use views::LineDetail;

pub struct DialogueService {
    machine: Arc<SessionStateMachine>,
    combos: Arc<dyn ComboRepository>,
    catalog: Arc<dyn CatalogLookup>,
    drafts: Mutex<HashMap<ChatId, SetupDraft>>,
    locks: ChatLocks,
}

/// Returns the command name of a `/command` message, without any `@botname` suffix.
fn parse_command(text: &str) -> Option<&str> {
    let command = text.trim().strip_prefix('/')?;
    let command = command.split_whitespace().next()?;
    let name = command.split('@').next().unwrap_or(command);
    Some(name)
}

impl DialogueService {
    pub fn new(
        machine: Arc<SessionStateMachine>,
        combos: Arc<dyn ComboRepository>,
        catalog: Arc<dyn CatalogLookup>,
    ) -> Self {
        Self {
            machine,
            combos,
            catalog,
            drafts: Mutex::new(HashMap::new()),
            locks: ChatLocks::new(),
        }
    }

    pub fn machine(&self) -> &Arc<SessionStateMachine> {
        &self.machine
    }

    /// Evicts transit sessions and setup drafts idle for longer than `ttl`.
    ///
    /// Returns how many conversations were dropped.
    pub async fn evict_idle(&self, ttl: Duration) -> Result<usize> {
        let sessions = self.machine.evict_idle(ttl).await?;

        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let cutoff = self
            .machine
            .clock()
            .now_utc()
            .checked_sub_signed(ttl)
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC);
        let drafts = {
            let mut drafts = self.drafts.lock().await;
            let before = drafts.len();
            drafts.retain(|_, draft| !draft.is_idle_since(cutoff));
            before - drafts.len()
        };
        self.locks.prune().await;

        if drafts > 0 {
            info!(drafts, "Evicted idle setup drafts");
        }
        Ok(sessions + drafts)
    }

    /// Handles one inbound event; an empty vector means it was ignored.
    pub async fn handle(&self, event: &InboundEvent) -> Result<Vec<OutboundMessage>> {
        let chat_id = event.chat_id;

        let token = match &event.kind {
            InboundKind::Text(text) => {
                return match parse_command(text) {
                    Some("start") | Some("menu") => {
                        self.drop_draft(chat_id).await;
                        Ok(vec![self.main_menu(chat_id).await?])
                    }
                    Some(other) => {
                        debug!(chat_id, command = other, "Ignoring unknown command");
                        Ok(Vec::new())
                    }
                    None => self.machine.handle(event).await,
                };
            }
            InboundKind::Selection(raw) => match Token::parse(raw) {
                Some(token) => token,
                None => {
                    debug!(chat_id, token = %raw, "Ignoring unknown selection");
                    return Ok(Vec::new());
                }
            },
        };

        match token {
            Token::MainMenu => {
                self.drop_draft(chat_id).await;
                Ok(vec![self.main_menu(chat_id).await?])
            }
            Token::SetupMenu => Ok(vec![views::setup_menu(chat_id)]),
            Token::SetupView => Ok(vec![self.listing(chat_id).await?]),
            Token::SetupNew => self.start_setup(chat_id).await,
            Token::SetupLine(_)
            | Token::SetupProduct(_)
            | Token::SetupSize(_)
            | Token::SetupMarket(_) => self.continue_setup(chat_id, token).await,
            Token::StartReport => {
                self.drop_draft(chat_id).await;
                self.machine.handle(event).await
            }
            _ => self.machine.handle(event).await,
        }
    }

    async fn drop_draft(&self, chat_id: ChatId) {
        self.drafts.lock().await.remove(&chat_id);
    }

    async fn main_menu(&self, chat_id: ChatId) -> Result<OutboundMessage> {
        let combos = self.combos.list_for_chat(chat_id).await?;
        Ok(views::main_menu(chat_id, self.machine.roster(), &combos))
    }

    async fn listing(&self, chat_id: ChatId) -> Result<OutboundMessage> {
        let mut combos = self.combos.list_for_chat(chat_id).await?;

        // Roster order first, then any line no longer on the roster.
        let mut ordered: Vec<(String, ComboAssignment)> = Vec::with_capacity(combos.len());
        for code in self.machine.roster().codes() {
            if let Some(combo) = combos.remove(code) {
                ordered.push((code.to_string(), combo));
            }
        }
        ordered.extend(combos);

        let mut lines = Vec::with_capacity(ordered.len());
        for (code, combo) in ordered {
            let detail = self.line_detail(&code, &combo).await?;
            lines.push((code, combo, detail));
        }
        Ok(views::listing(chat_id, &lines))
    }

    async fn line_detail(&self, code: &str, combo: &ComboAssignment) -> Result<LineDetail> {
        let entry = self.catalog.find(&combo.catalog_key()).await?;
        let Some(entry) = entry.as_ref().and_then(CatalogEntry::complete) else {
            let missing = entry.unwrap_or_default().missing_fields();
            return Ok(LineDetail::Missing(missing));
        };

        Ok(match self.machine.label_for(code, combo).await? {
            LabelOutcome::Ready(label) => LineDetail::Ready { entry, label },
            LabelOutcome::MissingCatalog { missing, .. } => LineDetail::Missing(missing),
        })
    }

    async fn start_setup(&self, chat_id: ChatId) -> Result<Vec<OutboundMessage>> {
        let _guard = self.locks.acquire(chat_id).await;

        self.machine.cancel(chat_id).await?;
        let draft = SetupDraft::new(self.machine.clock().now_utc());
        self.drafts.lock().await.insert(chat_id, draft);
        debug!(chat_id, "Combo setup started");

        let codes: Vec<String> = self.machine.roster().codes().map(str::to_string).collect();
        Ok(vec![views::pick(
            chat_id,
            "Data loading: select the filling line:".to_string(),
            &codes,
            2,
            Token::SetupLine,
        )])
    }

    async fn continue_setup(&self, chat_id: ChatId, token: Token) -> Result<Vec<OutboundMessage>> {
        let _guard = self.locks.acquire(chat_id).await;

        let Some(mut draft) = self.drafts.lock().await.get(&chat_id).cloned() else {
            return Ok(Vec::new());
        };
        let menus = self.machine.menus();

        let reply = match (draft.stage(), token) {
            (SetupStage::Line, Token::SetupLine(code)) if self.machine.roster().get(&code).is_some() => {
                let prompt = format!("{code}: select the product:");
                draft.line = Some(code);
                views::pick(chat_id, prompt, &menus.products, 2, Token::SetupProduct)
            }
            (SetupStage::Product, Token::SetupProduct(product)) if menus.products.contains(&product) => {
                let prompt = format!(
                    "{} {product}: select the size:",
                    draft.line.as_deref().unwrap_or_default()
                );
                draft.product = Some(product);
                views::pick(chat_id, prompt, &menus.sizes, 3, Token::SetupSize)
            }
            (SetupStage::Size, Token::SetupSize(size)) if menus.sizes.contains(&size) => {
                let prompt = format!(
                    "{} {} {size}: select the market:",
                    draft.line.as_deref().unwrap_or_default(),
                    draft.product.as_deref().unwrap_or_default()
                );
                draft.size = Some(size);
                views::pick(chat_id, prompt, &menus.markets, 2, Token::SetupMarket)
            }
            (SetupStage::Market, Token::SetupMarket(market)) if menus.markets.contains(&market) => {
                self.drafts.lock().await.remove(&chat_id);
                return self.finish_setup(chat_id, draft, market).await;
            }
            _ => return Ok(Vec::new()),
        };

        draft.last_activity = self.machine.clock().now_utc();
        self.drafts.lock().await.insert(chat_id, draft);
        Ok(vec![reply])
    }

    async fn finish_setup(
        &self,
        chat_id: ChatId,
        draft: SetupDraft,
        market: String,
    ) -> Result<Vec<OutboundMessage>> {
        let (Some(line), Some(product), Some(size)) = (draft.line, draft.product, draft.size) else {
            return Ok(vec![OutboundMessage::text(
                chat_id,
                "Missing data, the record was not saved.",
            )]);
        };
        let combo = ComboAssignment::new(product, size, market);
        let key = combo.catalog_key();

        let entry = self.catalog.find(&key).await?;
        if entry.as_ref().and_then(CatalogEntry::complete).is_none() {
            let text = match entry {
                None => format!("{key} is not in the catalog. The record was not saved."),
                Some(entry) => format!(
                    "{key} is incomplete in the catalog (missing: {}). The record was not saved.",
                    entry.missing_fields().join(", ")
                ),
            };
            warn!(chat_id, line = %line, combo = %key, "Rejected combo missing from catalog");
            return Ok(vec![OutboundMessage::text(chat_id, text)]);
        }

        self.combos.assign(chat_id, &line, combo.clone()).await?;
        info!(chat_id, line = %line, combo = %combo, "Combo assigned");

        let mut text = format!("Saved {line}: {combo}");
        if let LabelOutcome::Ready(label) = self.machine.label_for(&line, &combo).await? {
            text.push_str(&format!("\n\nLabel preview:\n{label}"));
        }

        Ok(vec![
            OutboundMessage::text(chat_id, text),
            self.main_menu(chat_id).await?,
        ])
    }
}

#[cfg(test)]
#[path = "dialogue_test.rs"]
mod tests;
