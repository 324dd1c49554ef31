//! In-progress combo assignment ("data loading") per chat.

use chrono::{DateTime, Utc};

/// Fields collected so far, in the order line → product → size → market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SetupDraft {
    pub line: Option<String>,
    pub product: Option<String>,
    pub size: Option<String>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetupStage {
    Line,
    Product,
    Size,
    Market,
}

impl SetupDraft {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            line: None,
            product: None,
            size: None,
            last_activity: now,
        }
    }

    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_activity < cutoff
    }

    pub fn stage(&self) -> SetupStage {
        match (&self.line, &self.product, &self.size) {
            (None, _, _) => SetupStage::Line,
            (Some(_), None, _) => SetupStage::Product,
            (Some(_), Some(_), None) => SetupStage::Size,
            (Some(_), Some(_), Some(_)) => SetupStage::Market,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_follows_filled_fields() {
        let mut draft = SetupDraft::new(Utc::now());
        assert_eq!(draft.stage(), SetupStage::Line);
        draft.line = Some("M1".into());
        assert_eq!(draft.stage(), SetupStage::Product);
        draft.product = Some("FND".into());
        assert_eq!(draft.stage(), SetupStage::Size);
        draft.size = Some("8oz".into());
        assert_eq!(draft.stage(), SetupStage::Market);
    }
}
