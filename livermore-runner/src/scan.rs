//! Sequential scan over a universe.
//!
//! One evaluation per instrument, in universe order. Matches are kept in the
//! order they were found; sorting is left to the reporter. A failing symbol
//! only counts against itself. Once the provider reports itself unavailable
//! (banned, circuit breaker open) the remaining instruments are skipped and
//! counted as failed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use livermore_core::data::DataProvider;
use livermore_core::signal::{EvaluationOutcome, SignalEvaluator, SignalResult};
use livermore_core::universe::Universe;

/// How often the console progress line is printed.
pub const PROGRESS_EVERY: usize = 10;

/// Receives one call per instrument, after it has been evaluated.
pub trait ScanProgress {
    /// `done` is 1-based.
    fn on_symbol(&mut self, done: usize, total: usize, symbol: &str);
}

/// Prints `Progress: i/total` every [`PROGRESS_EVERY`] instruments.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ScanProgress for ConsoleProgress {
    fn on_symbol(&mut self, done: usize, total: usize, _symbol: &str) {
        if done % PROGRESS_EVERY == 0 {
            println!("Progress: {done}/{total}");
        }
    }
}

#[derive(Debug, Default)]
pub struct SilentProgress;

impl ScanProgress for SilentProgress {
    fn on_symbol(&mut self, _done: usize, _total: usize, _symbol: &str) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total: usize,
    pub matched: usize,
    pub no_match: usize,
    pub insufficient: usize,
    pub failed: usize,
    /// Never requested because the provider was unavailable. Included in `failed`.
    pub skipped: usize,
}

impl ScanSummary {
    /// Instruments actually requested from the provider.
    pub fn evaluated(&self) -> usize {
        self.total - self.skipped
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub results: Vec<SignalResult>,
    pub summary: ScanSummary,
}

/// Evaluate every instrument in `universe` against `provider`.
pub fn run_scan(
    evaluator: &SignalEvaluator,
    provider: &dyn DataProvider,
    universe: &Universe,
    start: NaiveDate,
    end: NaiveDate,
    progress: &mut dyn ScanProgress,
) -> ScanReport {
    let total = universe.len();
    let mut summary = ScanSummary {
        total,
        ..ScanSummary::default()
    };
    let mut results = Vec::new();

    info!(total, provider = provider.name(), %start, %end, "scan started");

    for (i, instrument) in universe.instruments().iter().enumerate() {
        if !provider.is_available() {
            let remaining = total - i;
            warn!(
                provider = provider.name(),
                remaining, "provider unavailable, skipping rest of scan"
            );
            summary.failed += remaining;
            summary.skipped = remaining;
            break;
        }

        match evaluator.scan_symbol(provider, instrument, start, end) {
            EvaluationOutcome::Match(result) => {
                summary.matched += 1;
                results.push(result);
            }
            EvaluationOutcome::NoMatch => summary.no_match += 1,
            EvaluationOutcome::InsufficientData { .. } => summary.insufficient += 1,
            EvaluationOutcome::Failed(_) => summary.failed += 1,
        }

        progress.on_symbol(i + 1, total, &instrument.symbol);
    }

    info!(
        matched = summary.matched,
        no_match = summary.no_match,
        insufficient = summary.insufficient,
        failed = summary.failed,
        "scan finished"
    );

    ScanReport { results, summary }
}
