//! Filling lines and the values they pin down.

use crate::pin::PinSize;
use serde::{Deserialize, Serialize};

/// A physical packaging machine on the floor.
///
/// Any `fixed_*` value is applied without asking the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillingLine {
    pub code: String,
    #[serde(default)]
    pub letter: Option<String>,
    #[serde(default)]
    pub fixed_pin: Option<PinSize>,
    #[serde(default)]
    pub fixed_size: Option<String>,
    #[serde(default)]
    pub fixed_market: Option<String>,
}

impl FillingLine {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            letter: None,
            fixed_pin: None,
            fixed_size: None,
            fixed_market: None,
        }
    }

    pub fn with_letter(mut self, letter: impl Into<String>) -> Self {
        self.letter = Some(letter.into());
        self
    }

    pub fn with_fixed_pin(mut self, pin: PinSize) -> Self {
        self.fixed_pin = Some(pin);
        self
    }

    pub fn with_fixed_size(mut self, size: impl Into<String>) -> Self {
        self.fixed_size = Some(size.into());
        self
    }

    pub fn with_fixed_market(mut self, market: impl Into<String>) -> Self {
        self.fixed_market = Some(market.into());
        self
    }
}

/// The ordered set of lines offered to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineRoster {
    lines: Vec<FillingLine>,
}

impl LineRoster {
    pub fn new(lines: Vec<FillingLine>) -> Self {
        Self { lines }
    }

    pub fn get(&self, code: &str) -> Option<&FillingLine> {
        self.lines.iter().find(|line| line.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FillingLine> {
        self.lines.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.code.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for LineRoster {
    fn default() -> Self {
        Self::new(vec![
            FillingLine::new("M1").with_letter("B"),
            FillingLine::new("M2").with_letter("C"),
            FillingLine::new("M3")
                .with_letter("D")
                .with_fixed_pin(PinSize::Large),
            // Chub has no letter assigned yet.
            FillingLine::new("Chub").with_fixed_pin(PinSize::Single),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_matches_floor_layout() {
        let roster = LineRoster::default();
        assert_eq!(roster.codes().collect::<Vec<_>>(), vec!["M1", "M2", "M3", "Chub"]);
        assert_eq!(roster.get("M3").unwrap().fixed_pin, Some(PinSize::Large));
        assert_eq!(roster.get("Chub").unwrap().letter, None);
        assert!(roster.get("M9").is_none());
    }

    #[test]
    fn roster_deserializes_from_toml_array() {
        #[derive(Deserialize)]
        struct Wrapper {
            lines: LineRoster,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [[lines]]
            code = "M1"
            letter = "B"

            [[lines]]
            code = "Chub"
            fixed_pin = "único"
            fixed_size = "4lbs"
            "#,
        )
        .unwrap();

        let chub = parsed.lines.get("Chub").unwrap();
        assert_eq!(chub.fixed_pin, Some(PinSize::Single));
        assert_eq!(chub.fixed_size.as_deref(), Some("4lbs"));
        assert_eq!(parsed.lines.get("M1").unwrap().letter.as_deref(), Some("B"));
    }
}
