//! Transit session state.

use super::batch::BatchRecord;
use crate::combo::ComboAssignment;
use crate::pin::PinSize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Chat identifier as delivered by the transport.
pub type ChatId = i64;

/// Where a transit session stands in the field-collection order.
///
/// `Idle → SelectFillingLine → [SelectSize] → SelectProduct → [SelectMarket]
/// → EnterBasketCount → [SelectPin] → ConfirmAddAnother → SelectFillingLine | Finalized`
///
/// Bracketed steps are skipped when the filling line or the combo registry
/// already fixes the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    Idle,
    SelectFillingLine,
    SelectSize,
    SelectProduct,
    SelectMarket,
    EnterBasketCount,
    SelectPin,
    ConfirmAddAnother,
    /// Terminal. A finalized session is removed from the store, never saved.
    Finalized,
}

impl Step {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

/// One operator conversation. Exactly one exists per chat at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub chat_id: ChatId,
    pub step: Step,
    pub filling_line: Option<String>,
    pub product: Option<String>,
    pub size: Option<String>,
    pub market: Option<String>,
    pub basket_count: Option<u32>,
    pub pin_size: Option<PinSize>,
    pub batches: Vec<BatchRecord>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(chat_id: ChatId, now: DateTime<Utc>) -> Self {
        Self {
            chat_id,
            step: Step::Idle,
            filling_line: None,
            product: None,
            size: None,
            market: None,
            basket_count: None,
            pin_size: None,
            batches: Vec::new(),
            last_activity: now,
        }
    }

    /// Clears every per-lot field, keeping the accumulated batches.
    pub fn reset_batch_fields(&mut self) {
        self.filling_line = None;
        self.product = None;
        self.size = None;
        self.market = None;
        self.basket_count = None;
        self.pin_size = None;
    }

    pub fn apply_combo(&mut self, combo: &ComboAssignment) {
        self.product = Some(combo.product.clone());
        self.size = Some(combo.size.clone());
        self.market = Some(combo.market.clone());
    }

    /// The combo collected so far, once all three parts are known.
    pub fn combo(&self) -> Option<ComboAssignment> {
        Some(ComboAssignment::new(
            self.product.as_deref()?,
            self.size.as_deref()?,
            self.market.as_deref()?,
        ))
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_activity < cutoff
    }
}
