//! Batch records accumulated by a transit session.

use crate::error::{Result, TransitoError};
use crate::pin::{PinPolicy, PinSize};
use serde::{Deserialize, Serialize};

/// One reported lot.
///
/// Fields are private so a record can only come out of [`BatchRecord::new`],
/// which enforces a positive basket count and a pin permitted for the size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    filling_line: String,
    product: String,
    size: String,
    market: String,
    basket_count: u32,
    pin_size: PinSize,
}

/// Field set used to build a [`BatchRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFields<'a> {
    pub filling_line: &'a str,
    pub product: &'a str,
    pub size: &'a str,
    pub market: &'a str,
    pub basket_count: u32,
    pub pin_size: PinSize,
}

impl BatchRecord {
    pub fn new(fields: BatchFields<'_>, policy: &PinPolicy) -> Result<Self> {
        if fields.basket_count == 0 {
            return Err(TransitoError::invalid_batch("basket count must be positive"));
        }
        if !policy.is_valid(fields.size, fields.pin_size) {
            return Err(TransitoError::invalid_batch(format!(
                "pin {} is not permitted for size {}",
                fields.pin_size, fields.size
            )));
        }

        Ok(Self {
            filling_line: fields.filling_line.to_string(),
            product: fields.product.to_string(),
            size: fields.size.to_string(),
            market: fields.market.to_string(),
            basket_count: fields.basket_count,
            pin_size: fields.pin_size,
        })
    }

    pub fn filling_line(&self) -> &str {
        &self.filling_line
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn basket_count(&self) -> u32 {
        self.basket_count
    }

    pub fn pin_size(&self) -> PinSize {
        self.pin_size
    }
}
