//! Livermore Core: domain types, indicators, data providers, universe and the breakout rule.
//!
//! This crate holds everything needed to decide whether one instrument is in
//! a strong breakout:
//! - Domain types (bars, price series, instruments)
//! - Indicator trait with SMA and rolling highest-high
//! - Data providers (Yahoo Finance, CSV, synthetic) behind one trait
//! - Universe assembly and metadata resolution
//! - Breakout rule and the per-instrument signal evaluator

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signal;
pub mod universe;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: shared types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::Instrument>();
        require_sync::<domain::Instrument>();
        require_send::<domain::InstrumentMeta>();
        require_sync::<domain::InstrumentMeta>();

        // Data
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();

        // Universe
        require_send::<universe::Universe>();
        require_sync::<universe::Universe>();
        require_send::<universe::MetadataResolver>();
        require_sync::<universe::MetadataResolver>();

        // Signal
        require_send::<signal::BreakoutRule>();
        require_sync::<signal::BreakoutRule>();
        require_send::<signal::SignalEvaluator>();
        require_sync::<signal::SignalEvaluator>();
        require_send::<signal::SignalResult>();
        require_sync::<signal::SignalResult>();
    }

    /// The evaluator sees only bars; it cannot reach the network on its own.
    #[test]
    fn evaluate_takes_only_a_series() {
        fn _check(
            evaluator: &signal::SignalEvaluator,
            instrument: &domain::Instrument,
            series: &domain::PriceSeries,
        ) -> Option<signal::SignalResult> {
            evaluator.evaluate(instrument, series)
        }
    }
}
