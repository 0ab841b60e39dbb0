//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance, CSV
//! import, synthetic) so the scan can swap implementations and tests can mock.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, BarError};

/// Structured error types for data operations.
///
/// Every variant is a per-symbol condition: the scan logs it and moves on.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("validation error: {0}")]
    Validation(#[from] BarError),

    #[error("csv import error for '{symbol}': {reason}")]
    CsvImport { symbol: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    /// Bars as delivered; may still contain void (NaN) sessions.
    pub bars: Vec<Bar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for price series providers.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

/// Inclusive date range ending at `end` and reaching `months` calendar months back.
///
/// Six months of daily bars (the default scan window) covers roughly 120
/// sessions, comfortably above the 62 the default rule needs.
pub fn history_window(end: NaiveDate, months: u32) -> (NaiveDate, NaiveDate) {
    let start = end
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    (start, end)
}
