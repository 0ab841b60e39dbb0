//! PriceSeries: the chronological bar snapshot of one symbol.

use serde::{Deserialize, Serialize};

use super::bar::{Bar, BarError};
use super::ids::DatasetHash;

/// Ordered bars for one symbol, oldest first.
///
/// Construction checks that dates strictly increase; after that the series
/// is never mutated. Evaluation only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BarError> {
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(BarError::OutOfOrder {
                    index: index + 1,
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// BLAKE3 content hash over symbol and every bar field.
    ///
    /// Two snapshots with the same fingerprint evaluate identically.
    pub fn fingerprint(&self) -> DatasetHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for bar in &self.bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        DatasetHash::from_hash(hasher.finalize().to_hex().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let err = PriceSeries::new("2330.TW", vec![bar(2, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, BarError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn rejects_duplicate_dates() {
        assert!(PriceSeries::new("2330.TW", vec![bar(4, 10.0), bar(4, 11.0)]).is_err());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = PriceSeries::new("GC=F", vec![bar(1, 10.0), bar(2, 11.0)]).unwrap();
        let b = PriceSeries::new("GC=F", vec![bar(1, 10.0), bar(2, 11.0)]).unwrap();
        let c = PriceSeries::new("GC=F", vec![bar(1, 10.0), bar(2, 11.5)]).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn empty_series_has_no_last_bar() {
        let s = PriceSeries::new("SI=F", vec![]).unwrap();
        assert!(s.is_empty());
        assert!(s.last().is_none());
    }
}
