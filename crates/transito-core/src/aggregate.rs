//! Box totals per filling line and for the whole shift.

use crate::conversion::UnitConversionTable;
use crate::pin::PinSize;
use crate::session::BatchRecord;
use std::fmt;

/// Renders a quantity without decimals when it is whole, with one decimal otherwise.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Conversion result for a single lot.
#[derive(Debug, Clone, PartialEq)]
pub struct LotSummary {
    pub index: usize,
    pub filling_line: String,
    pub product: String,
    pub size: String,
    pub market: String,
    pub pin_size: PinSize,
    pub basket_count: u32,
    pub factor: f64,
    pub boxes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineTotals {
    pub filling_line: String,
    pub baskets: u64,
    pub boxes: f64,
}

/// Aggregated view of a finished transit session.
///
/// `per_line` keeps the order in which lines first appear in the batches.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub lots: Vec<LotSummary>,
    pub per_line: Vec<LineTotals>,
    pub total_baskets: u64,
    pub total_boxes: f64,
}

/// Turns batch records into box totals.
#[derive(Debug, Clone, Default)]
pub struct BatchAggregator {
    table: UnitConversionTable,
}

impl BatchAggregator {
    pub fn new(table: UnitConversionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &UnitConversionTable {
        &self.table
    }

    pub fn summarize(&self, batches: &[BatchRecord]) -> BatchSummary {
        let mut lots = Vec::with_capacity(batches.len());
        let mut per_line: Vec<LineTotals> = Vec::new();
        let mut total_baskets = 0u64;
        let mut total_boxes = 0.0f64;

        for (idx, batch) in batches.iter().enumerate() {
            let factor = self.table.factor(batch.size(), batch.pin_size());
            let boxes = f64::from(batch.basket_count()) * factor;

            let position = match per_line
                .iter()
                .position(|t| t.filling_line == batch.filling_line())
            {
                Some(pos) => pos,
                None => {
                    per_line.push(LineTotals {
                        filling_line: batch.filling_line().to_string(),
                        baskets: 0,
                        boxes: 0.0,
                    });
                    per_line.len() - 1
                }
            };
            per_line[position].baskets += u64::from(batch.basket_count());
            per_line[position].boxes += boxes;

            total_baskets += u64::from(batch.basket_count());
            total_boxes += boxes;

            lots.push(LotSummary {
                index: idx + 1,
                filling_line: batch.filling_line().to_string(),
                product: batch.product().to_string(),
                size: batch.size().to_string(),
                market: batch.market().to_string(),
                pin_size: batch.pin_size(),
                basket_count: batch.basket_count(),
                factor,
                boxes,
            });
        }

        BatchSummary {
            lots,
            per_line,
            total_baskets,
            total_boxes,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shift summary:")?;
        for lot in &self.lots {
            writeln!(f)?;
            writeln!(f, "Lot {}", lot.index)?;
            writeln!(f, "Line: {}", lot.filling_line)?;
            writeln!(f, "Size: {}", lot.size)?;
            writeln!(f, "Product: {}", lot.product)?;
            writeln!(f, "Market: {}", lot.market)?;
            writeln!(f, "Baskets: {} | Pin: {}", lot.basket_count, lot.pin_size)?;
            writeln!(
                f,
                "Boxes: {} (~{} per basket)",
                format_quantity(lot.boxes),
                format_quantity(lot.factor)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Totals per line:")?;
        for line in &self.per_line {
            writeln!(
                f,
                "- {}: baskets {} | boxes {}",
                line.filling_line,
                line.baskets,
                format_quantity(line.boxes)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Grand totals:")?;
        writeln!(f, "Baskets: {}", self.total_baskets)?;
        write!(f, "Boxes: {}", format_quantity(self.total_boxes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinPolicy;
    use crate::session::BatchFields;
    use std::collections::{BTreeSet, HashMap};

    fn record(line: &str, size: &str, pin: PinSize, baskets: u32, policy: &PinPolicy) -> BatchRecord {
        BatchRecord::new(
            BatchFields {
                filling_line: line,
                product: "FND",
                size,
                market: "RTCA",
                basket_count: baskets,
                pin_size: pin,
            },
            policy,
        )
        .expect("valid batch")
    }

    #[test]
    fn whole_and_fractional_quantities() {
        assert_eq!(format_quantity(935.0), "935");
        assert_eq!(format_quantity(93.5), "93.5");
        assert_eq!(format_quantity(0.0), "0");
        assert_eq!(format_quantity(46.72), "46.7");
    }

    #[test]
    fn eight_ounce_small_pin_ten_baskets_is_935_boxes() {
        let policy = PinPolicy::default();
        let summary = BatchAggregator::default()
            .summarize(&[record("M1", "8oz", PinSize::Small, 10, &policy)]);
        assert_eq!(summary.total_boxes, 935.0);
        assert_eq!(format_quantity(summary.total_boxes), "935");
    }

    #[test]
    fn unsupported_combination_yields_zero_boxes() {
        // The default policy forbids this pairing; widen it to reach the table's zero cell.
        let permitted = HashMap::from([(
            "4oz".to_string(),
            BTreeSet::from([PinSize::Small, PinSize::Large]),
        )]);
        let policy = PinPolicy::new(permitted, HashMap::new());
        let summary = BatchAggregator::default()
            .summarize(&[record("M2", "4oz", PinSize::Large, 40, &policy)]);
        assert_eq!(summary.total_boxes, 0.0);
        assert_eq!(summary.total_baskets, 40);
    }

    #[test]
    fn groups_by_first_seen_line_order() {
        let policy = PinPolicy::default();
        let batches = vec![
            record("M3", "28oz", PinSize::Large, 2, &policy),
            record("M1", "8oz", PinSize::Small, 1, &policy),
            record("M3", "28oz", PinSize::Large, 3, &policy),
        ];
        let summary = BatchAggregator::default().summarize(&batches);

        let order: Vec<&str> = summary.per_line.iter().map(|t| t.filling_line.as_str()).collect();
        assert_eq!(order, vec!["M3", "M1"]);
        assert_eq!(summary.per_line[0].baskets, 5);
        assert_eq!(summary.per_line[0].boxes, 290.0);
        assert_eq!(summary.per_line[1].boxes, 93.5);
        assert_eq!(summary.total_baskets, 6);
        assert_eq!(format_quantity(summary.total_boxes), "383.5");
    }

    #[test]
    fn summarize_is_repeatable() {
        let policy = PinPolicy::default();
        let batches = vec![
            record("M1", "8oz", PinSize::Small, 3, &policy),
            record("M2", "14oz", PinSize::Small, 7, &policy),
        ];
        let aggregator = BatchAggregator::default();
        assert_eq!(aggregator.summarize(&batches), aggregator.summarize(&batches));
    }

    #[test]
    fn rendered_summary_lists_totals() {
        let policy = PinPolicy::default();
        let summary = BatchAggregator::default()
            .summarize(&[record("M1", "8oz", PinSize::Small, 1, &policy)]);
        let text = summary.to_string();
        assert!(text.contains("Lot 1"));
        assert!(text.contains("- M1: baskets 1 | boxes 93.5"));
        assert!(text.ends_with("Boxes: 93.5"));
    }
}
