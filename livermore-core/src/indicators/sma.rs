//! Simple Moving Average (SMA) of close prices.
//!
//! Each output is the plain mean of the `period` closes ending at that bar,
//! summed afresh per window so no rounding drift accumulates across the
//! series. Lookback: period - 1. A NaN close poisons every window holding it.

use super::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: Self::key(period),
        }
    }

    /// Indicator key for a given period, e.g. `sma_20`.
    pub fn key(period: usize) -> String {
        format!("sma_{period}")
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        if bars.len() < self.period {
            return result;
        }

        for (offset, window) in bars.windows(self.period).enumerate() {
            let sum: f64 = window.iter().map(|bar| bar.close).sum();
            // NaN propagates through the sum on its own.
            result[offset + self.period - 1] = sum / self.period as f64;
        }

        result
    }
}
