//! CSV import provider: one file per symbol under a directory.
//!
//! Layout: `{dir}/{SYMBOL}.csv` with header `date,open,high,low,close,volume`
//! and ISO dates. Rows outside the requested range are skipped.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<u64>,
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_rows(symbol: &str, path: &Path) -> Result<Vec<CsvRow>, DataError> {
        let csv_err = |reason: String| DataError::CsvImport {
            symbol: symbol.to_string(),
            reason,
        };
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| csv_err(format!("{}: {e}", path.display())))?;
        reader
            .deserialize()
            .collect::<Result<Vec<CsvRow>, _>>()
            .map_err(|e| csv_err(e.to_string()))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let bars = Self::read_rows(symbol, &path)?
            .into_iter()
            .filter(|row| row.date >= start && row.date <= end)
            .map(|row| Bar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.unwrap_or(0),
            })
            .collect();

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}
