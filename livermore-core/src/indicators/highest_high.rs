//! Highest high over a trailing window (upper Donchian band).
//!
//! Output at bar t is max(high[t-period+1..=t]). Lookback: period - 1.
//! Missing (NaN) highs are skipped; a window with no known high is NaN.
//! The breakout rule reads this one bar back so today is excluded.

use super::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct HighestHigh {
    period: usize,
    name: String,
}

impl HighestHigh {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "HighestHigh period must be >= 1");
        Self {
            period,
            name: Self::key(period),
        }
    }

    pub fn key(period: usize) -> String {
        format!("highest_high_{period}")
    }
}

impl Indicator for HighestHigh {
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
            let highest = window
                .iter()
                .map(|bar| bar.high)
                .filter(|high| !high.is_nan())
                .reduce(f64::max);
            result[offset + self.period - 1] = highest.unwrap_or(f64::NAN);
        }

        result
    }
}
