//! Instrument universe: which symbols a scan visits, in which order.
//!
//! Commodities come first (table order), then equities in listing order.
//! A universe can also be pinned in a TOML file:
//!
//! ```toml
//! equities = ["2330.TW", "6488.TWO"]
//!
//! [[commodities]]
//! symbol = "GC=F"
//! name = "Gold Futures"
//! ```

pub mod commodities;
pub mod listing;
pub mod metadata;

pub use commodities::{CommodityEntry, CommodityTable, COMMODITY_CATEGORY};
pub use listing::{ListingDirectory, ListingRecord};
pub use metadata::{
    LongNameLookup, LongNameSource, MetadataResolver, MetadataSource, OTHER_CATEGORY,
};

use crate::domain::{Instrument, Venue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Large-cap equities scanned in test mode instead of the full listing.
pub const TEST_MODE_EQUITIES: [&str; 3] = ["2330.TW", "2317.TW", "2603.TW"];

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse listing: {0}")]
    Listing(String),

    #[error("parse universe TOML: {0}")]
    Toml(String),
}

/// On-disk universe definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniverseFile {
    #[serde(default)]
    pub equities: Vec<String>,
    #[serde(default)]
    pub commodities: Vec<CommodityEntry>,
}

impl UniverseFile {
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        toml::from_str(content).map_err(|e| UniverseError::Toml(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        toml::to_string_pretty(self).map_err(|e| UniverseError::Toml(e.to_string()))
    }

    pub fn commodity_table(&self) -> CommodityTable {
        CommodityTable::new(self.commodities.clone())
    }
}

/// Ordered, read-only list of instruments to scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    instruments: Vec<Instrument>,
}

impl Universe {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// Commodities followed by every common stock in the listing.
    pub fn full(commodities: &CommodityTable, listing: &ListingDirectory) -> Self {
        let instruments = commodities.instruments().chain(listing.equities()).collect();
        Self { instruments }
    }

    /// Commodities plus a handful of large caps; no listing needed.
    pub fn test_mode(commodities: &CommodityTable) -> Self {
        let instruments = commodities
            .instruments()
            .chain(TEST_MODE_EQUITIES.iter().map(|s| Instrument::from_symbol(s)))
            .collect();
        Self { instruments }
    }

    pub fn from_file(file: &UniverseFile) -> Self {
        let instruments = file
            .commodity_table()
            .instruments()
            .chain(file.equities.iter().map(|s| Instrument::from_symbol(s)))
            .collect();
        Self { instruments }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn count_by_venue(&self, venue: Venue) -> usize {
        self.instruments.iter().filter(|i| i.venue == venue).count()
    }
}
