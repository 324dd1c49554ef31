//! The transit reporting state machine.
//!
//! One conversation per chat walks through the steps of [`Step`]. Every
//! inbound event is handled to completion under the chat's lock; the machine
//! reads combos and catalog rows through collaborator traits and answers with
//! [`OutboundMessage`]s, so it performs no transport I/O itself.
//!
//! Inputs that do not fit the current step are ignored: no mutation and no
//! reply.

use super::batch::{BatchFields, BatchRecord};
use super::event::{Choice, InboundEvent, InboundKind, OutboundMessage};
use super::locks::ChatLocks;
use super::model::{ChatId, Session, Step};
use super::store::SessionStore;
use super::token::Token;
use crate::aggregate::BatchAggregator;
use crate::catalog::{CatalogEntry, CatalogKey, CatalogLookup};
use crate::clock::{Clock, SystemClock};
use crate::combo::{ComboAssignment, ComboRegistry};
use crate::error::Result;
use crate::label::{LabelCode, LabelGenerator, LabelRequest};
use crate::line::{FillingLine, LineRoster};
use crate::menus::Menus;
use crate::pin::{PinPolicy, PinSize};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

/// How the product/size/market of a lot is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboResolution {
    /// Read from the combo registry for the selected line.
    #[default]
    Registry,
    /// Asked to the operator, step by step.
    Manual,
}

/// Feature switches of the transit pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub combo_resolution: ComboResolution,
    pub label_generation: bool,
    /// Chat that receives a copy of every finalized summary.
    pub broadcast_chat: Option<ChatId>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            combo_resolution: ComboResolution::Registry,
            label_generation: true,
            broadcast_chat: None,
        }
    }
}

/// Result of trying to build a label for a combo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    Ready(LabelCode),
    MissingCatalog {
        key: CatalogKey,
        missing: Vec<&'static str>,
    },
}

enum Input {
    Text(String),
    Token(Token),
}

enum SessionUpdate {
    Keep,
    /// Same step, fresh activity stamp.
    Touch(Session),
    Save(Session),
    Remove,
}

struct Transition {
    update: SessionUpdate,
    replies: Vec<OutboundMessage>,
}

impl Transition {
    fn ignored() -> Self {
        Self {
            update: SessionUpdate::Keep,
            replies: Vec::new(),
        }
    }

    fn reply(session: Session, message: OutboundMessage) -> Self {
        Self {
            update: SessionUpdate::Touch(session),
            replies: vec![message],
        }
    }

    fn save(session: Session, message: OutboundMessage) -> Self {
        Self {
            update: SessionUpdate::Save(session),
            replies: vec![message],
        }
    }

    fn abort(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            update: SessionUpdate::Remove,
            replies: vec![OutboundMessage::text(chat_id, text)],
        }
    }
}

pub struct SessionStateMachine {
    store: Arc<dyn SessionStore>,
    combos: Arc<dyn ComboRegistry>,
    catalog: Arc<dyn CatalogLookup>,
    clock: Arc<dyn Clock>,
    roster: LineRoster,
    menus: Menus,
    pins: PinPolicy,
    aggregator: BatchAggregator,
    labels: LabelGenerator,
    options: PipelineOptions,
    locks: ChatLocks,
}

impl SessionStateMachine {
    /// Creates a machine with the default floor tables and the system clock.
    pub fn new(
        store: Arc<dyn SessionStore>,
        combos: Arc<dyn ComboRegistry>,
        catalog: Arc<dyn CatalogLookup>,
    ) -> Self {
        Self {
            store,
            combos,
            catalog,
            clock: Arc::new(SystemClock),
            roster: LineRoster::default(),
            menus: Menus::default(),
            pins: PinPolicy::default(),
            aggregator: BatchAggregator::default(),
            labels: LabelGenerator::default(),
            options: PipelineOptions::default(),
            locks: ChatLocks::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_roster(mut self, roster: LineRoster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_menus(mut self, menus: Menus) -> Self {
        self.menus = menus;
        self
    }

    pub fn with_pin_policy(mut self, pins: PinPolicy) -> Self {
        self.pins = pins;
        self
    }

    pub fn with_aggregator(mut self, aggregator: BatchAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_label_generator(mut self, labels: LabelGenerator) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn roster(&self) -> &LineRoster {
        &self.roster
    }

    pub fn menus(&self) -> &Menus {
        &self.menus
    }

    pub fn pin_policy(&self) -> &PinPolicy {
        &self.pins
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Handles one inbound event and returns the replies to deliver.
    ///
    /// An empty vector means the event was ignored. On `Err` the stored
    /// session is left as it was before the event.
    pub async fn handle(&self, event: &InboundEvent) -> Result<Vec<OutboundMessage>> {
        let input = match &event.kind {
            InboundKind::Text(text) => Input::Text(text.clone()),
            InboundKind::Selection(raw) => match Token::parse(raw) {
                Some(token) => Input::Token(token),
                None => return Ok(Vec::new()),
            },
        };

        let _guard = self.locks.acquire(event.chat_id).await;

        if matches!(input, Input::Token(Token::StartReport)) {
            return self.start_locked(event.chat_id).await;
        }

        let Some(session) = self.store.get(event.chat_id).await? else {
            return Ok(Vec::new());
        };

        let step = session.step;
        let transition = self.transition(session, input).await?;
        self.apply(event.chat_id, step, transition).await
    }

    /// Opens a fresh transit session, replacing whatever the chat had open.
    pub async fn start(&self, chat_id: ChatId) -> Result<Vec<OutboundMessage>> {
        let _guard = self.locks.acquire(chat_id).await;
        self.start_locked(chat_id).await
    }

    /// Drops the chat's session, if any.
    pub async fn cancel(&self, chat_id: ChatId) -> Result<()> {
        let _guard = self.locks.acquire(chat_id).await;
        self.store.delete(chat_id).await
    }

    pub async fn has_session(&self, chat_id: ChatId) -> Result<bool> {
        Ok(self.store.get(chat_id).await?.is_some())
    }

    /// Removes sessions idle for longer than `ttl`.
    pub async fn evict_idle(&self, ttl: Duration) -> Result<usize> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let cutoff = self
            .clock
            .now_utc()
            .checked_sub_signed(ttl)
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC);
        let evicted = self.store.evict_idle(cutoff).await?;
        self.locks.prune().await;
        if evicted > 0 {
            let active = self.store.count().await?;
            info!(evicted, active, "Evicted idle transit sessions");
        }
        Ok(evicted)
    }

    /// Builds the label for `combo` running on `line_code`, at the current time.
    pub async fn label_for(&self, line_code: &str, combo: &ComboAssignment) -> Result<LabelOutcome> {
        let key = combo.catalog_key();
        let entry = self.catalog.find(&key).await?;
        let Some(complete) = entry.as_ref().and_then(CatalogEntry::complete) else {
            let missing = entry
                .map(|e| e.missing_fields())
                .unwrap_or_else(|| CatalogEntry::default().missing_fields());
            return Ok(LabelOutcome::MissingCatalog { key, missing });
        };

        let letter = self
            .roster
            .get(line_code)
            .and_then(|line| line.letter.as_deref());
        let label = self.labels.generate(
            &LabelRequest {
                line_letter: letter,
                market: &combo.market,
                sku: &complete.sku,
                shelf_life_months: complete.shelf_life_months,
            },
            self.clock.now_local(),
        )?;
        Ok(LabelOutcome::Ready(label))
    }

    async fn start_locked(&self, chat_id: ChatId) -> Result<Vec<OutboundMessage>> {
        let mut session = Session::new(chat_id, self.clock.now_utc());
        session.step = Step::SelectFillingLine;
        let prompt = self.line_prompt(chat_id);
        self.store.put(session).await?;
        debug!(chat_id, "Transit session started");
        Ok(vec![prompt])
    }

    async fn apply(
        &self,
        chat_id: ChatId,
        from: Step,
        transition: Transition,
    ) -> Result<Vec<OutboundMessage>> {
        match transition.update {
            SessionUpdate::Keep => {}
            SessionUpdate::Touch(mut session) => {
                session.touch(self.clock.now_utc());
                self.store.put(session).await?;
            }
            SessionUpdate::Save(session) if session.step.is_terminal() => {
                self.store.delete(chat_id).await?;
            }
            SessionUpdate::Save(mut session) => {
                debug!(chat_id, from = %from, to = %session.step, "Session transition");
                session.touch(self.clock.now_utc());
                self.store.put(session).await?;
            }
            SessionUpdate::Remove => {
                self.store.delete(chat_id).await?;
            }
        }
        Ok(transition.replies)
    }

    async fn transition(&self, session: Session, input: Input) -> Result<Transition> {
        match session.step {
            Step::Idle | Step::Finalized => Ok(Transition::ignored()),
            Step::SelectFillingLine => match input {
                Input::Token(Token::Line(code)) => self.on_line(session, &code).await,
                _ => Ok(Transition::ignored()),
            },
            Step::SelectSize => match input {
                Input::Token(Token::Size(size)) if self.menus.sizes.contains(&size) => {
                    let mut session = session;
                    session.size = Some(size);
                    self.advance_manual(session).await
                }
                _ => Ok(Transition::ignored()),
            },
            Step::SelectProduct => match input {
                Input::Token(Token::Product(product)) if self.menus.products.contains(&product) => {
                    let mut session = session;
                    session.product = Some(product);
                    self.advance_manual(session).await
                }
                _ => Ok(Transition::ignored()),
            },
            Step::SelectMarket => match input {
                Input::Token(Token::Market(market)) if self.menus.markets.contains(&market) => {
                    let mut session = session;
                    session.market = Some(market);
                    self.advance_manual(session).await
                }
                _ => Ok(Transition::ignored()),
            },
            Step::EnterBasketCount => match input {
                Input::Text(text) => self.on_basket_count(session, &text).await,
                _ => Ok(Transition::ignored()),
            },
            Step::SelectPin => match input {
                Input::Token(Token::Pin(pin)) => self.on_pin(session, pin).await,
                _ => Ok(Transition::ignored()),
            },
            Step::ConfirmAddAnother => match input {
                Input::Token(Token::ShowLabel) if self.options.label_generation => {
                    self.on_show_label(session).await
                }
                Input::Token(Token::AddAnother(more)) => Ok(self.on_confirm(session, more)),
                _ => Ok(Transition::ignored()),
            },
        }
    }

    async fn on_line(&self, mut session: Session, code: &str) -> Result<Transition> {
        let chat_id = session.chat_id;
        let Some(line) = self.roster.get(code) else {
            return Ok(Transition::ignored());
        };

        match self.options.combo_resolution {
            ComboResolution::Registry => {
                let Some(combo) = self.combos.find(chat_id, code).await? else {
                    return Ok(Transition::reply(
                        session,
                        OutboundMessage::text(
                            chat_id,
                            format!(
                                "No record for {code}.\nUse Load to assign a product/size/market."
                            ),
                        )
                        .with_row(vec![Choice::new("Create record now", &Token::SetupNew)])
                        .with_row(vec![Choice::new("Back", &Token::MainMenu)]),
                    ));
                };

                session.filling_line = Some(code.to_string());
                session.apply_combo(&combo);
                session.step = Step::EnterBasketCount;
                let prompt = OutboundMessage::text(
                    chat_id,
                    format!("{code}: {combo}\n\nHow many baskets were reported?"),
                );
                Ok(Transition::save(session, prompt))
            }
            ComboResolution::Manual => {
                session.filling_line = Some(code.to_string());
                session.size = line.fixed_size.clone();
                session.market = line.fixed_market.clone();
                self.advance_manual(session).await
            }
        }
    }

    /// Moves a manual session to the first field still missing.
    async fn advance_manual(&self, mut session: Session) -> Result<Transition> {
        let chat_id = session.chat_id;

        if session.size.is_none() {
            session.step = Step::SelectSize;
            let choices = self
                .menus
                .sizes
                .iter()
                .map(|s| Choice::new(s, &Token::Size(s.clone())))
                .collect();
            let prompt = OutboundMessage::text(chat_id, "Select the size:").with_grid(choices, 3);
            return Ok(Transition::save(session, prompt));
        }
        if session.product.is_none() {
            session.step = Step::SelectProduct;
            let choices = self
                .menus
                .products
                .iter()
                .map(|p| Choice::new(p, &Token::Product(p.clone())))
                .collect();
            let prompt =
                OutboundMessage::text(chat_id, "Select the product:").with_grid(choices, 2);
            return Ok(Transition::save(session, prompt));
        }
        if session.market.is_none() {
            session.step = Step::SelectMarket;
            let choices = self
                .menus
                .markets
                .iter()
                .map(|m| Choice::new(m, &Token::Market(m.clone())))
                .collect();
            let prompt =
                OutboundMessage::text(chat_id, "Select the market:").with_grid(choices, 2);
            return Ok(Transition::save(session, prompt));
        }

        let Some(combo) = session.combo() else {
            return Ok(Transition::abort(chat_id, "Missing data to close the lot."));
        };
        if self.options.label_generation {
            let key = combo.catalog_key();
            let entry = self.catalog.find(&key).await?;
            if entry.as_ref().and_then(CatalogEntry::complete).is_none() {
                warn!(chat_id, combo = %key, "Combo absent or incomplete in catalog");
                return Ok(Transition::abort(
                    chat_id,
                    format!(
                        "This combo is not in the catalog or is incomplete:\n{key}\nAdd its SKU and shelf life and try again."
                    ),
                ));
            }
        }

        session.step = Step::EnterBasketCount;
        let line = session.filling_line.as_deref().unwrap_or_default();
        let prompt = OutboundMessage::text(
            chat_id,
            format!("{line}: {combo}\n\nHow many baskets were reported?"),
        );
        Ok(Transition::save(session, prompt))
    }

    async fn on_basket_count(&self, mut session: Session, text: &str) -> Result<Transition> {
        let chat_id = session.chat_id;
        let count = match text.trim().parse::<u32>() {
            Ok(count) if count > 0 => count,
            _ => {
                return Ok(Transition::reply(
                    session,
                    OutboundMessage::text(
                        chat_id,
                        "Enter a valid number of baskets (positive integer).",
                    ),
                ));
            }
        };

        let (Some(line), Some(size)) = (
            session
                .filling_line
                .as_deref()
                .and_then(|code| self.roster.get(code)),
            session.size.clone(),
        ) else {
            return Ok(Transition::abort(chat_id, "Missing data to close the lot."));
        };
        session.basket_count = Some(count);

        match line.fixed_pin {
            Some(pin) => {
                if !self.pins.is_valid(&size, pin) {
                    warn!(chat_id, line = %line.code, size = %size, pin = %pin, "Fixed pin inconsistent with size");
                    return Ok(Transition::abort(
                        chat_id,
                        format!(
                            "Inconsistent configuration: {size} does not accept pin {pin}. Fix the size under Data loading."
                        ),
                    ));
                }
                session.pin_size = Some(pin);
                session.step = Step::ConfirmAddAnother;
                let prompt = self
                    .confirm_prompt(
                        &session,
                        format!("Baskets: {count}\nPin assigned automatically: {pin}"),
                    )
                    .await?;
                Ok(Transition::save(session, prompt))
            }
            None => {
                session.step = Step::SelectPin;
                let prompt = self.pin_prompt(chat_id, line, count, &size);
                Ok(Transition::save(session, prompt))
            }
        }
    }

    async fn on_pin(&self, mut session: Session, pin: PinSize) -> Result<Transition> {
        let chat_id = session.chat_id;
        let (Some(line), Some(size), Some(count)) = (
            session
                .filling_line
                .as_deref()
                .and_then(|code| self.roster.get(code)),
            session.size.clone(),
            session.basket_count,
        ) else {
            return Ok(Transition::abort(chat_id, "Missing data to close the lot."));
        };

        if !self.pins.is_valid(&size, pin) {
            let mut retry = self.pin_prompt(chat_id, line, count, &size);
            retry.text = format!("Pin {pin} is not valid for {size}.\n\n{}", retry.text);
            return Ok(Transition::reply(session, retry));
        }

        session.pin_size = Some(pin);
        session.step = Step::ConfirmAddAnother;
        let prompt = self.confirm_prompt(&session, format!("Pin: {pin}")).await?;
        Ok(Transition::save(session, prompt))
    }

    async fn on_show_label(&self, session: Session) -> Result<Transition> {
        let chat_id = session.chat_id;
        let outcome = match (session.filling_line.as_deref(), session.combo()) {
            (Some(line), Some(combo)) => Some(self.label_for(line, &combo).await?),
            _ => None,
        };

        let message = match outcome {
            Some(LabelOutcome::Ready(label)) => {
                OutboundMessage::text(chat_id, format!("Label (now):\n{label}"))
            }
            _ => OutboundMessage::text(
                chat_id,
                "Missing catalog or configuration data to build the label.",
            ),
        };
        Ok(Transition::reply(session, message))
    }

    fn on_confirm(&self, mut session: Session, more: bool) -> Transition {
        let chat_id = session.chat_id;

        let record = match (
            session.filling_line.as_deref(),
            session.product.as_deref(),
            session.size.as_deref(),
            session.market.as_deref(),
            session.basket_count,
            session.pin_size,
        ) {
            (Some(line), Some(product), Some(size), Some(market), Some(count), Some(pin)) => {
                BatchRecord::new(
                    BatchFields {
                        filling_line: line,
                        product,
                        size,
                        market,
                        basket_count: count,
                        pin_size: pin,
                    },
                    &self.pins,
                )
            }
            _ => return Transition::abort(chat_id, "Missing data to close the lot."),
        };
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(chat_id, error = %err, "Rejected lot on close");
                return Transition::abort(chat_id, format!("The lot could not be closed: {err}"));
            }
        };
        session.batches.push(record);

        if more {
            session.reset_batch_fields();
            session.step = Step::SelectFillingLine;
            let prompt = self.line_prompt(chat_id);
            return Transition::save(session, prompt);
        }

        session.step = Step::Finalized;
        let summary = self.aggregator.summarize(&session.batches);
        info!(
            chat_id,
            lots = summary.lots.len(),
            baskets = summary.total_baskets,
            boxes = summary.total_boxes,
            "Transit session finalized"
        );

        let text = summary.to_string();
        let mut replies = vec![OutboundMessage::text(chat_id, text.clone())];
        if let Some(group) = self.options.broadcast_chat.filter(|g| *g != chat_id) {
            replies.push(OutboundMessage::text(group, text));
        }
        Transition {
            update: SessionUpdate::Remove,
            replies,
        }
    }

    fn line_prompt(&self, chat_id: ChatId) -> OutboundMessage {
        let choices = self
            .roster
            .codes()
            .map(|code| Choice::new(code, &Token::Line(code.to_string())))
            .collect();
        OutboundMessage::text(chat_id, "Select filling line:").with_grid(choices, 2)
    }

    fn pin_prompt(
        &self,
        chat_id: ChatId,
        line: &FillingLine,
        count: u32,
        size: &str,
    ) -> OutboundMessage {
        let suggested = self.pins.suggest(size);
        let permitted = self.pins.permitted(size);

        let choices = PinSize::iter()
            .filter(|pin| *pin != PinSize::Single || permitted.contains(pin))
            .map(|pin| {
                let label = if Some(pin) == suggested {
                    format!("Pin {pin} (suggested)")
                } else {
                    format!("Pin {pin}")
                };
                Choice::new(label, &Token::Pin(pin))
            })
            .collect();

        let mut text = format!("{}: baskets {count}\nSize: {size}\n\n", line.code);
        if let Some(pin) = suggested {
            text.push_str(&format!("Suggested: {pin} (you can change it)\n\n"));
        }
        text.push_str("Select the pin size:");

        OutboundMessage::text(chat_id, text).with_grid(choices, 3)
    }

    async fn confirm_prompt(&self, session: &Session, prefix: String) -> Result<OutboundMessage> {
        let chat_id = session.chat_id;
        let mut text = prefix;

        if self.options.label_generation {
            if let (Some(line), Some(combo)) = (session.filling_line.as_deref(), session.combo()) {
                if let LabelOutcome::Ready(label) = self.label_for(line, &combo).await? {
                    text.push_str(&format!("\n\nSuggested label:\n{label}"));
                }
            }
        }
        text.push_str("\n\nAdd another lot?");

        let mut message = OutboundMessage::text(chat_id, text);
        if self.options.label_generation {
            message = message.with_row(vec![Choice::new("Show label", &Token::ShowLabel)]);
        }
        Ok(message.with_row(vec![
            Choice::new("Yes", &Token::AddAnother(true)),
            Choice::new("No", &Token::AddAnother(false)),
        ]))
    }
}

#[cfg(test)]
#[path = "machine_test.rs"]
mod tests;
