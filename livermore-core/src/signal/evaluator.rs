//! Signal evaluator: breakout rule plus display metadata.
//!
//! This is the per-instrument boundary of a scan. Whatever goes wrong while
//! fetching or shaping one symbol's series is turned into an
//! [`EvaluationOutcome`] here and never escapes as an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::breakout::{Breakout, BreakoutRule};
use crate::data::{ingest, DataError, DataProvider};
use crate::domain::{Instrument, PriceSeries};
use crate::universe::MetadataResolver;

/// Longest display name before truncation.
pub const MAX_NAME_CHARS: usize = 8;
/// Appended to truncated names.
pub const TRUNCATION_MARKER: &str = "..";

/// One qualifying instrument, ready for the reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    /// Display symbol: bare code for equities, full symbol for commodities.
    pub symbol: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub prior_high: f64,
    pub up_streak: usize,
    pub stop_loss: f64,
}

/// How one symbol's evaluation ended.
#[derive(Debug)]
pub enum EvaluationOutcome {
    Match(SignalResult),
    NoMatch,
    InsufficientData { bars: usize, required: usize },
    Failed(DataError),
}

impl EvaluationOutcome {
    pub fn into_match(self) -> Option<SignalResult> {
        match self {
            EvaluationOutcome::Match(result) => Some(result),
            _ => None,
        }
    }
}

/// Cut `name` to [`MAX_NAME_CHARS`] characters plus the marker.
///
/// Counts characters, not bytes, so CJK names are cut on glyph boundaries.
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > MAX_NAME_CHARS {
        let mut cut: String = name.chars().take(MAX_NAME_CHARS).collect();
        cut.push_str(TRUNCATION_MARKER);
        cut
    } else {
        name.to_string()
    }
}

pub struct SignalEvaluator {
    rule: BreakoutRule,
    resolver: MetadataResolver,
}

impl SignalEvaluator {
    pub fn new(rule: BreakoutRule, resolver: MetadataResolver) -> Self {
        Self { rule, resolver }
    }

    pub fn rule(&self) -> &BreakoutRule {
        &self.rule
    }

    pub fn resolver(&self) -> &MetadataResolver {
        &self.resolver
    }

    /// Evaluate an already-fetched series. Same snapshot, same answer.
    pub fn evaluate(&self, instrument: &Instrument, series: &PriceSeries) -> Option<SignalResult> {
        let breakout = self.rule.detect(series)?;
        Some(self.build_result(instrument, &breakout))
    }

    fn build_result(&self, instrument: &Instrument, breakout: &Breakout) -> SignalResult {
        let meta = self.resolver.resolve(instrument);
        SignalResult {
            symbol: instrument.code().to_string(),
            name: truncate_name(&meta.name),
            category: meta.category,
            price: breakout.entry_price,
            prior_high: breakout.prior_high,
            up_streak: breakout.up_streak,
            stop_loss: breakout.stop_loss,
        }
    }

    /// Fetch, shape and evaluate one instrument, containing every failure.
    pub fn scan_symbol(
        &self,
        provider: &dyn DataProvider,
        instrument: &Instrument,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EvaluationOutcome {
        let series = match provider
            .fetch(&instrument.symbol, start, end)
            .and_then(ingest)
        {
            Ok(series) => series,
            Err(e) => {
                debug!(symbol = %instrument.symbol, error = %e, "fetch failed");
                return EvaluationOutcome::Failed(e);
            }
        };

        let required = self.rule.min_bars();
        if series.len() < required {
            debug!(
                symbol = %instrument.symbol,
                bars = series.len(),
                required,
                "insufficient history"
            );
            return EvaluationOutcome::InsufficientData {
                bars: series.len(),
                required,
            };
        }

        match self.evaluate(instrument, &series) {
            Some(result) => {
                debug!(symbol = %instrument.symbol, price = result.price, "breakout");
                EvaluationOutcome::Match(result)
            }
            None => EvaluationOutcome::NoMatch,
        }
    }
}
