//! Fixed commodity futures table.

use crate::domain::{Instrument, InstrumentMeta, Venue};
use serde::{Deserialize, Serialize};

/// Category label shared by every commodity future.
pub const COMMODITY_CATEGORY: &str = "Commodities";

/// One futures contract and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommodityEntry {
    pub symbol: String,
    pub name: String,
}

/// Ordered symbol → display name table. Iteration order is scan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommodityTable {
    entries: Vec<CommodityEntry>,
}

impl CommodityTable {
    pub fn new(entries: Vec<CommodityEntry>) -> Self {
        Self { entries }
    }

    /// Precious metals, copper and crude oil front-month futures.
    pub fn default_futures() -> Self {
        let entries = [
            ("GC=F", "Gold Futures"),
            ("SI=F", "Silver Futures"),
            ("PL=F", "Platinum Futures"),
            ("HG=F", "Copper Futures"),
            ("PA=F", "Palladium Futures"),
            ("CL=F", "Crude Oil Futures"),
        ]
        .into_iter()
        .map(|(symbol, name)| CommodityEntry {
            symbol: symbol.into(),
            name: name.into(),
        })
        .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CommodityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn instruments(&self) -> impl Iterator<Item = Instrument> + '_ {
        self.entries
            .iter()
            .map(|entry| Instrument::new(entry.symbol.clone(), Venue::Commodity))
    }

    pub fn get(&self, symbol: &str) -> Option<InstrumentMeta> {
        self.entries
            .iter()
            .find(|entry| entry.symbol == symbol)
            .map(|entry| InstrumentMeta::new(entry.name.clone(), COMMODITY_CATEGORY))
    }
}
