//! Breakout detection and per-instrument evaluation.

pub mod breakout;
pub mod evaluator;

pub use breakout::{consecutive_up_days, Breakout, BreakoutRule, Inspection, DEFAULT_MA_PERIODS};
pub use evaluator::{
    truncate_name, EvaluationOutcome, SignalEvaluator, SignalResult, MAX_NAME_CHARS,
    TRUNCATION_MARKER,
};
