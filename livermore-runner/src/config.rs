//! Scan configuration from the environment.
//!
//! Values come from process environment variables, with a local `.env` file
//! loaded first when present. Command-line flags override whatever is read
//! here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_TEST_MODE: &str = "TEST_MODE";
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_LOOKBACK_DAYS: &str = "LOOKBACK_DAYS";
pub const ENV_HISTORY_MONTHS: &str = "HISTORY_MONTHS";
pub const ENV_LISTING_FILE: &str = "LISTING_FILE";
pub const ENV_SORT_BY: &str = "SORT_BY";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

pub const DEFAULT_LOOKBACK_DAYS: usize = 60;
pub const DEFAULT_HISTORY_MONTHS: u32 = 6;
pub const DEFAULT_LISTING_FILE: &str = "data/twse_equities.csv";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {key}='{value}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Row order of the rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Group by category, then symbol.
    #[default]
    Category,
    Symbol,
    /// Longest up streak first.
    Streak,
    /// Scan order.
    None,
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "category" => Ok(SortKey::Category),
            "symbol" => Ok(SortKey::Symbol),
            "streak" => Ok(SortKey::Streak),
            "none" => Ok(SortKey::None),
            _ => Err(ConfigError::invalid(
                ENV_SORT_BY,
                s,
                "expected one of: category, symbol, streak, none",
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::Category => "category",
            SortKey::Symbol => "symbol",
            SortKey::Streak => "streak",
            SortKey::None => "none",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Scan commodities plus a few large caps instead of the whole listing.
    pub test_mode: bool,
    pub slack_webhook_url: Option<String>,
    pub lookback_days: usize,
    pub history_months: u32,
    pub listing_file: PathBuf,
    pub sort_by: SortKey,
    pub log_level: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            slack_webhook_url: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            history_months: DEFAULT_HISTORY_MONTHS,
            listing_file: PathBuf::from(DEFAULT_LISTING_FILE),
            sort_by: SortKey::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ScanConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        // Only the word "true", in any case, enables test mode.
        if let Some(v) = get(ENV_TEST_MODE) {
            config.test_mode = v.eq_ignore_ascii_case("true");
        }
        config.slack_webhook_url = get(ENV_SLACK_WEBHOOK_URL).map(|v| v.trim().to_string());
        if let Some(v) = get(ENV_LOOKBACK_DAYS) {
            config.lookback_days = parse_positive(ENV_LOOKBACK_DAYS, &v)?;
        }
        if let Some(v) = get(ENV_HISTORY_MONTHS) {
            config.history_months = parse_positive(ENV_HISTORY_MONTHS, &v)?;
        }
        if let Some(v) = get(ENV_LISTING_FILE) {
            config.listing_file = PathBuf::from(v.trim());
        }
        if let Some(v) = get(ENV_SORT_BY) {
            config.sort_by = v.parse()?;
        }
        if let Some(v) = get(ENV_LOG_LEVEL) {
            config.log_level = v.trim().to_string();
        }
        Ok(config)
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + From<u8>,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, value, "not a number"))?;
    if parsed < T::from(1) {
        return Err(ConfigError::invalid(key, value, "must be at least 1"));
    }
    Ok(parsed)
}
