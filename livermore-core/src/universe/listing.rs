//! Equity listing directory in the twstock CSV layout.
//!
//! Columns: `type,code,name,ISIN,start,market,group,CFI`. Only common stocks
//! (`股票`) listed on the main board (`上市`) or the OTC board (`上櫃`) enter
//! the universe, but every row is available for name lookup so ETFs scanned
//! by explicit symbol still resolve.

use super::metadata::OTHER_CATEGORY;
use super::UniverseError;
use crate::domain::{Instrument, InstrumentMeta, Venue};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const COMMON_STOCK: &str = "股票";
const MAIN_BOARD: &str = "上市";
const OTC_BOARD: &str = "上櫃";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    pub name: String,
    #[serde(rename = "ISIN", default)]
    pub isin: String,
    #[serde(default)]
    pub start: String,
    pub market: String,
    #[serde(default)]
    pub group: String,
    #[serde(rename = "CFI", default)]
    pub cfi: String,
}

impl ListingRecord {
    /// Board the record trades on, if it is one we scan.
    pub fn venue(&self) -> Option<Venue> {
        match self.market.as_str() {
            MAIN_BOARD => Some(Venue::Listed),
            OTC_BOARD => Some(Venue::OverTheCounter),
            _ => None,
        }
    }

    pub fn is_common_stock(&self) -> bool {
        self.kind == COMMON_STOCK
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingDirectory {
    records: Vec<ListingRecord>,
    by_code: HashMap<String, usize>,
}

impl ListingDirectory {
    pub fn from_records(records: Vec<ListingRecord>) -> Self {
        let by_code = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.code.clone(), i))
            .collect();
        Self { records, by_code }
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, UniverseError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let records = csv_reader
            .deserialize()
            .collect::<Result<Vec<ListingRecord>, _>>()
            .map_err(|e| UniverseError::Listing(e.to_string()))?;
        Ok(Self::from_records(records))
    }

    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let file = std::fs::File::open(path).map_err(|source| UniverseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&ListingRecord> {
        self.by_code.get(code).map(|&i| &self.records[i])
    }

    /// Common stocks on either board, in file order.
    pub fn equities(&self) -> impl Iterator<Item = Instrument> + '_ {
        self.records
            .iter()
            .filter(|r| r.is_common_stock())
            .filter_map(|r| r.venue().map(|venue| Instrument::equity(&r.code, venue)))
    }

    /// Name and industry group. ETFs carry no group and get the generic label.
    pub fn meta(&self, code: &str) -> Option<InstrumentMeta> {
        self.get(code).map(|r| {
            let category = if r.group.trim().is_empty() {
                OTHER_CATEGORY
            } else {
                r.group.as_str()
            };
            InstrumentMeta::new(r.name.clone(), category)
        })
    }
}
