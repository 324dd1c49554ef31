//! Baskets to boxes conversion factors.

use crate::pin::PinSize;
use std::collections::HashMap;

/// Maps `(size, pin)` to the number of boxes one basket fills.
///
/// A missing entry yields `0.0`: an unsupported combination silently produces
/// zero boxes instead of failing. Several zero cells in the default table may be
/// unfinished data rather than a real "no boxes" rule, so callers must not
/// assume a nonzero factor exists.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConversionTable {
    factors: HashMap<String, HashMap<PinSize, f64>>,
}

impl UnitConversionTable {
    pub fn new(factors: HashMap<String, HashMap<PinSize, f64>>) -> Self {
        Self { factors }
    }

    pub fn factor(&self, size: &str, pin: PinSize) -> f64 {
        self.factors
            .get(size)
            .and_then(|by_pin| by_pin.get(&pin))
            .copied()
            .unwrap_or(0.0)
    }

    /// True when the table holds a nonzero factor for the combination.
    pub fn is_supported(&self, size: &str, pin: PinSize) -> bool {
        self.factor(size, pin) > 0.0
    }
}

impl Default for UnitConversionTable {
    fn default() -> Self {
        use PinSize::*;

        let rows: [(&str, &[(PinSize, f64)]); 9] = [
            ("4oz", &[(Large, 0.0), (Small, 110.0)]),
            ("8oz", &[(Large, 68.0), (Small, 93.5)]),
            ("14oz", &[(Large, 80.0), (Small, 110.0)]),
            ("16oz", &[(Large, 0.0), (Small, 165.0)]),
            ("28oz", &[(Large, 58.0), (Small, 0.0)]),
            ("35oz", &[(Large, 53.0), (Small, 0.0)]),
            ("40oz", &[(Large, 48.0), (Small, 0.0)]),
            ("80oz", &[(Large, 53.0), (Small, 0.0)]),
            ("4lbs", &[(Single, 81.0)]),
        ];

        let factors = rows
            .into_iter()
            .map(|(size, cells)| (size.to_string(), cells.iter().copied().collect()))
            .collect();

        Self { factors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_combination_returns_its_factor() {
        let table = UnitConversionTable::default();
        assert_eq!(table.factor("8oz", PinSize::Small), 93.5);
        assert_eq!(table.factor("4lbs", PinSize::Single), 81.0);
    }

    #[test]
    fn zero_cell_and_missing_cell_both_yield_zero() {
        let table = UnitConversionTable::default();
        assert_eq!(table.factor("4oz", PinSize::Large), 0.0);
        assert_eq!(table.factor("4lbs", PinSize::Large), 0.0);
        assert_eq!(table.factor("12oz", PinSize::Small), 0.0);
        assert!(!table.is_supported("4oz", PinSize::Large));
        assert!(table.is_supported("4oz", PinSize::Small));
    }
}
