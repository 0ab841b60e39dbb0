//! Display metadata resolution chain.
//!
//! Sources are tried in order; each may miss or fail on its own without
//! affecting the others. When all miss, the raw symbol becomes the name and
//! the category degrades to [`OTHER_CATEGORY`]. Resolution never fails.

use super::commodities::CommodityTable;
use super::listing::ListingDirectory;
use crate::data::{DataError, YahooProvider};
use crate::domain::{Instrument, InstrumentMeta, Venue};
use std::sync::Arc;
use tracing::debug;

/// Category for instruments no structured source knows about.
pub const OTHER_CATEGORY: &str = "Other/ETF";

/// One strategy in the resolution chain.
pub trait MetadataSource: Send + Sync {
    fn name(&self) -> &str;

    /// `None` means "not mine, ask the next source".
    fn lookup(&self, instrument: &Instrument) -> Option<InstrumentMeta>;
}

impl MetadataSource for CommodityTable {
    fn name(&self) -> &str {
        "commodity_table"
    }

    fn lookup(&self, instrument: &Instrument) -> Option<InstrumentMeta> {
        self.get(&instrument.symbol)
    }
}

impl MetadataSource for ListingDirectory {
    fn name(&self) -> &str {
        "listing_directory"
    }

    fn lookup(&self, instrument: &Instrument) -> Option<InstrumentMeta> {
        match instrument.venue {
            Venue::Listed | Venue::OverTheCounter => self.meta(instrument.code()),
            Venue::Commodity => None,
        }
    }
}

/// Anything that can look up a free-form long name for a provider symbol.
pub trait LongNameLookup: Send + Sync {
    fn long_name(&self, symbol: &str) -> Result<Option<String>, DataError>;
}

impl LongNameLookup for YahooProvider {
    fn long_name(&self, symbol: &str) -> Result<Option<String>, DataError> {
        YahooProvider::long_name(self, symbol)
    }
}

/// Secondary lookup: a long name from the quote provider, generic category.
pub struct LongNameSource {
    lookup: Arc<dyn LongNameLookup>,
}

impl LongNameSource {
    pub fn new(lookup: Arc<dyn LongNameLookup>) -> Self {
        Self { lookup }
    }
}

impl MetadataSource for LongNameSource {
    fn name(&self) -> &str {
        "long_name_lookup"
    }

    fn lookup(&self, instrument: &Instrument) -> Option<InstrumentMeta> {
        match self.lookup.long_name(&instrument.symbol) {
            Ok(Some(name)) => Some(InstrumentMeta::new(name, OTHER_CATEGORY)),
            Ok(None) => None,
            Err(e) => {
                debug!(symbol = %instrument.symbol, error = %e, "long name lookup failed");
                None
            }
        }
    }
}

#[derive(Default)]
pub struct MetadataResolver {
    sources: Vec<Box<dyn MetadataSource>>,
}

impl MetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; earlier sources win.
    pub fn with_source(mut self, source: impl MetadataSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn resolve(&self, instrument: &Instrument) -> InstrumentMeta {
        self.sources
            .iter()
            .find_map(|source| source.lookup(instrument))
            .unwrap_or_else(|| InstrumentMeta::new(instrument.symbol.clone(), OTHER_CATEGORY))
    }
}
