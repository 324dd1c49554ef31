//! Closure (pin) sizes and the rules tying them to container sizes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Seal/closure hardware applied to a container.
///
/// The serialized names are the ones operators see on the floor and the ones
/// stored in the legacy JSON files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
pub enum PinSize {
    #[serde(rename = "pequeño")]
    #[strum(serialize = "pequeño")]
    Small,
    #[serde(rename = "grande")]
    #[strum(serialize = "grande")]
    Large,
    /// Single closure used by the chub machine.
    #[serde(rename = "único")]
    #[strum(serialize = "único")]
    Single,
}

/// Suggests and validates the pin for a container size.
///
/// Unknown sizes have an empty permitted set, so every pin is invalid for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinPolicy {
    permitted: HashMap<String, BTreeSet<PinSize>>,
    suggested: HashMap<String, PinSize>,
}

impl PinPolicy {
    /// Builds a policy from explicit tables.
    ///
    /// Suggestions that fall outside the permitted set of their size are
    /// dropped, so `suggest` never proposes a pin that `is_valid` rejects.
    pub fn new(
        permitted: HashMap<String, BTreeSet<PinSize>>,
        suggested: HashMap<String, PinSize>,
    ) -> Self {
        let suggested = suggested
            .into_iter()
            .filter(|(size, pin)| permitted.get(size).is_some_and(|set| set.contains(pin)))
            .collect();
        Self {
            permitted,
            suggested,
        }
    }

    /// Returns the default closure for `size`, if one is known.
    pub fn suggest(&self, size: &str) -> Option<PinSize> {
        self.suggested.get(size).copied()
    }

    pub fn is_valid(&self, size: &str, pin: PinSize) -> bool {
        self.permitted
            .get(size)
            .is_some_and(|set| set.contains(&pin))
    }

    /// The permitted pins for `size`, in a stable order.
    pub fn permitted(&self, size: &str) -> Vec<PinSize> {
        self.permitted
            .get(size)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every size the policy knows about.
    pub fn sizes(&self) -> impl Iterator<Item = &str> {
        self.permitted.keys().map(String::as_str)
    }
}

impl Default for PinPolicy {
    fn default() -> Self {
        use PinSize::*;

        let permitted = [
            ("4oz", Small),
            ("8oz", Small),
            ("14oz", Small),
            ("16oz", Small),
            ("28oz", Large),
            ("35oz", Large),
            ("40oz", Large),
            ("80oz", Large),
            ("4lbs", Single),
        ]
        .into_iter()
        .map(|(size, pin)| (size.to_string(), BTreeSet::from([pin])))
        .collect();

        // 40oz and 4lbs intentionally have no suggestion.
        let suggested = [
            ("4oz", Small),
            ("8oz", Small),
            ("14oz", Small),
            ("16oz", Small),
            ("28oz", Large),
            ("35oz", Large),
            ("80oz", Large),
        ]
        .into_iter()
        .map(|(size, pin)| (size.to_string(), pin))
        .collect();

        Self::new(permitted, suggested)
    }
}
