//! Shape raw provider output into a validated [`PriceSeries`].

use tracing::debug;

use super::provider::{DataError, FetchResult};
use crate::domain::PriceSeries;

/// Drop blank sessions and check chronological order.
///
/// Holidays arrive as bars with every price NaN and are removed. A session
/// with only some fields missing is kept: its known prices still count, and
/// indicators decide how to treat the gaps.
pub fn ingest(fetched: FetchResult) -> Result<PriceSeries, DataError> {
    let FetchResult { symbol, bars, .. } = fetched;
    let delivered = bars.len();
    let bars: Vec<_> = bars.into_iter().filter(|bar| !bar.is_blank()).collect();
    if bars.len() < delivered {
        debug!(
            symbol = %symbol,
            dropped = delivered - bars.len(),
            "dropped blank bars"
        );
    }
    Ok(PriceSeries::new(symbol, bars)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::DataSource;
    use crate::domain::Bar;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }

    #[test]
    fn void_bars_are_dropped() {
        let fetched = FetchResult {
            symbol: "2330.TW".into(),
            bars: vec![bar(1, 10.0), bar(2, f64::NAN), bar(3, 11.0)],
            source: DataSource::YahooFinance,
        };
        let series = ingest(fetched).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), "2330.TW");
    }

    #[test]
    fn partially_missing_bars_are_kept() {
        let mut partial = bar(2, 10.5);
        partial.open = f64::NAN;
        let fetched = FetchResult {
            symbol: "2330.TW".into(),
            bars: vec![bar(1, 10.0), partial, bar(3, 11.0)],
            source: DataSource::YahooFinance,
        };
        let series = ingest(fetched).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars()[1].high, 10.5);
        assert!(series.bars()[1].open.is_nan());
    }

    #[test]
    fn disorder_is_a_validation_error() {
        let fetched = FetchResult {
            symbol: "2330.TW".into(),
            bars: vec![bar(3, 10.0), bar(2, 11.0)],
            source: DataSource::CsvImport,
        };
        assert!(matches!(ingest(fetched), Err(DataError::Validation(_))));
    }
}
