//! Deterministic synthetic bars for offline runs and demos.
//!
//! The random walk is seeded from the BLAKE3 hash of the symbol, so the same
//! symbol and date range always produce the same series.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic random-walk provider. `drift` is the mean daily return.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    drift: f64,
    volatility: f64,
}

impl SyntheticProvider {
    pub fn new(drift: f64, volatility: f64) -> Self {
        Self { drift, volatility }
    }

    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = start;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return = self.drift + rng.gen_range(-self.volatility..=self.volatility);
            let open = price;
            let close = (price * (1.0 + daily_return)).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));

            bars.push(Bar {
                date: current,
                open,
                high,
                low,
                close,
                volume: rng.gen_range(500_000..5_000_000u64),
            });

            price = close;
            current += chrono::Duration::days(1);
        }

        bars
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new(0.001, 0.03)
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: self.generate(symbol, start, end),
            source: DataSource::Synthetic,
        })
    }
}
