//! Instruments and their display metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an instrument trades. Determines the Yahoo symbol suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    /// Taiwan Stock Exchange main board (`.TW`).
    Listed,
    /// Taipei Exchange over-the-counter board (`.TWO`).
    OverTheCounter,
    /// Commodity futures quoted under their own symbol (e.g. `GC=F`).
    Commodity,
}

impl Venue {
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Venue::Listed => Some(".TW"),
            Venue::OverTheCounter => Some(".TWO"),
            Venue::Commodity => None,
        }
    }

    /// Infer the venue from a provider symbol.
    pub fn from_symbol(symbol: &str) -> Self {
        if symbol.ends_with(".TWO") {
            Venue::OverTheCounter
        } else if symbol.ends_with(".TW") {
            Venue::Listed
        } else {
            Venue::Commodity
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Venue::Listed => "listed",
            Venue::OverTheCounter => "otc",
            Venue::Commodity => "commodity",
        };
        f.write_str(label)
    }
}

/// One member of the scan universe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Provider symbol, e.g. `2330.TW` or `CL=F`.
    pub symbol: String,
    pub venue: Venue,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, venue: Venue) -> Self {
        Self {
            symbol: symbol.into(),
            venue,
        }
    }

    /// Build an equity instrument from its bare code.
    pub fn equity(code: &str, venue: Venue) -> Self {
        let suffix = venue.suffix().unwrap_or_default();
        Self::new(format!("{code}{suffix}"), venue)
    }

    pub fn commodity(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Venue::Commodity)
    }

    /// Parse a provider symbol, inferring the venue from its suffix.
    pub fn from_symbol(symbol: &str) -> Self {
        Self::new(symbol, Venue::from_symbol(symbol))
    }

    /// Bare exchange code for equities (`2330`), full symbol for commodities.
    pub fn code(&self) -> &str {
        match self.venue {
            Venue::Commodity => &self.symbol,
            Venue::Listed | Venue::OverTheCounter => {
                self.symbol.split('.').next().unwrap_or(&self.symbol)
            }
        }
    }
}

/// Display metadata resolved for an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMeta {
    pub name: String,
    pub category: String,
}

impl InstrumentMeta {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}
