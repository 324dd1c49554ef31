//! Traceability label printed on every container.
//!
//! A label has three lines:
//!
//! ```text
//! B 08:30 24 L 10        <- line letter, time, year, julian day
//! BEST BY 15 JAN 25      <- expiration (English for FDA, Spanish otherwise)
//! 6173 7401234           <- fixed prefix + SKU
//! ```

use crate::error::{Result, TransitoError};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// Shown in place of the letter for lines that have none assigned yet.
pub const LETTER_PLACEHOLDER: &str = "—";
pub const DEFAULT_SKU_PREFIX: &str = "6173";
/// Expiration dates always land on this day of the month.
pub const EXPIRATION_DAY: u32 = 15;
/// Market whose labels are printed in English with a "BEST BY" prefix.
pub const FDA_MARKET: &str = "FDA";

const MONTHS_ES: [&str; 12] = [
    "ENE", "FEB", "MAR", "ABR", "MAY", "JUN", "JUL", "AGO", "SEP", "OCT", "NOV", "DIC",
];
const MONTHS_EN: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Everything needed to encode a label besides the reference time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRequest<'a> {
    pub line_letter: Option<&'a str>,
    pub market: &'a str,
    pub sku: &'a str,
    pub shelf_life_months: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCode {
    pub production: String,
    pub expiration: String,
    pub sku: String,
}

impl LabelCode {
    pub fn lines(&self) -> [&str; 3] {
        [&self.production, &self.expiration, &self.sku]
    }
}

impl fmt::Display for LabelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.production, self.expiration, self.sku)
    }
}

/// Adds `months` to `reference`, pinning the day to the 15th and keeping hour and minute.
///
/// Returns `None` only when the resulting year leaves chrono's range.
pub fn expiration_date(reference: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    let offset = i64::from(reference.month0()) + i64::from(months);
    let year = i64::from(reference.year()) + offset.div_euclid(12);
    let month = u32::try_from(offset.rem_euclid(12)).ok()? + 1;

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, EXPIRATION_DAY)?.and_hms_opt(
        reference.hour(),
        reference.minute(),
        0,
    )
}

fn two_digit_year(date: &NaiveDateTime) -> i32 {
    date.year().rem_euclid(100)
}

#[derive(Debug, Clone)]
pub struct LabelGenerator {
    sku_prefix: String,
}

impl LabelGenerator {
    pub fn new(sku_prefix: impl Into<String>) -> Self {
        Self {
            sku_prefix: sku_prefix.into(),
        }
    }

    pub fn sku_prefix(&self) -> &str {
        &self.sku_prefix
    }

    pub fn generate(&self, request: &LabelRequest<'_>, at: NaiveDateTime) -> Result<LabelCode> {
        let letter = request.line_letter.unwrap_or(LETTER_PLACEHOLDER);
        let production = format!(
            "{} {} {:02} L {}",
            letter,
            at.format("%H:%M"),
            two_digit_year(&at),
            at.ordinal()
        );

        let expires = expiration_date(at, request.shelf_life_months).ok_or_else(|| {
            TransitoError::internal(format!(
                "shelf life of {} months overflows the calendar",
                request.shelf_life_months
            ))
        })?;
        let month_idx = expires.month0() as usize;
        let (prefix, month) = if request.market == FDA_MARKET {
            ("BEST BY", MONTHS_EN[month_idx])
        } else {
            ("EXP", MONTHS_ES[month_idx])
        };
        let expiration = format!(
            "{} {} {} {:02}",
            prefix,
            EXPIRATION_DAY,
            month,
            two_digit_year(&expires)
        );

        Ok(LabelCode {
            production,
            expiration,
            sku: format!("{} {}", self.sku_prefix, request.sku),
        })
    }
}

impl Default for LabelGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SKU_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    #[test]
    fn december_plus_two_months_rolls_into_next_year() {
        let expires = expiration_date(at(2024, 12, 3, 6, 45), 2).unwrap();
        assert_eq!(expires.month(), 2);
        assert_eq!(expires.year(), 2025);
        assert_eq!(expires.day(), 15);
        assert_eq!((expires.hour(), expires.minute()), (6, 45));
    }

    #[test]
    fn zero_months_keeps_month_but_moves_day() {
        let expires = expiration_date(at(2024, 5, 31, 0, 0), 0).unwrap();
        assert_eq!((expires.year(), expires.month(), expires.day()), (2024, 5, 15));
    }

    #[test]
    fn fda_label_uses_best_by_in_english() {
        let label = LabelGenerator::default()
            .generate(
                &LabelRequest {
                    line_letter: Some("B"),
                    market: "FDA",
                    sku: "7401234",
                    shelf_life_months: 12,
                },
                at(2024, 1, 10, 8, 30),
            )
            .unwrap();

        assert_eq!(label.production, "B 08:30 24 L 10");
        assert_eq!(label.expiration, "BEST BY 15 JAN 25");
        assert_eq!(label.sku, "6173 7401234");
        assert_eq!(label.to_string(), "B 08:30 24 L 10\nBEST BY 15 JAN 25\n6173 7401234");
    }

    #[test]
    fn other_markets_use_spanish_exp() {
        let label = LabelGenerator::default()
            .generate(
                &LabelRequest {
                    line_letter: Some("D"),
                    market: "RTCA",
                    sku: "55",
                    shelf_life_months: 18,
                },
                at(2024, 12, 31, 23, 5),
            )
            .unwrap();

        // 2024 is a leap year, so Dec 31 is day 366.
        assert_eq!(label.production, "D 23:05 24 L 366");
        assert_eq!(label.expiration, "EXP 15 JUN 26");
    }

    #[test]
    fn missing_letter_uses_placeholder() {
        let label = LabelGenerator::new("9999")
            .generate(
                &LabelRequest {
                    line_letter: None,
                    market: "RTCA",
                    sku: "1",
                    shelf_life_months: 1,
                },
                at(2025, 1, 1, 0, 0),
            )
            .unwrap();
        assert_eq!(label.production, "— 00:00 25 L 1");
        assert_eq!(label.expiration, "EXP 15 FEB 25");
        assert_eq!(label.lines()[2], "9999 1");
    }
}
