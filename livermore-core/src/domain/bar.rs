//! Bar: one trading session for one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLC bar. Prices are in the instrument's quote currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Returns true if every OHLC field is NaN (no session at all).
    pub fn is_blank(&self) -> bool {
        self.open.is_nan() && self.high.is_nan() && self.low.is_nan() && self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }

    /// Close strictly above open. A flat session is not an up-day.
    pub fn is_up_day(&self) -> bool {
        self.close > self.open
    }
}

/// Structural problems with a bar sequence.
#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("bars out of order at index {index}: {previous} is not before {current}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
}
