//! Livermore Runner: scan orchestration, configuration, reporting, notification.
//!
//! This crate builds on `livermore-core` to provide:
//! - Environment-driven scan configuration (`.env` aware)
//! - Logging setup
//! - The sequential scan loop with progress and a summary
//! - Console table rendering
//! - Slack webhook notification

pub mod config;
pub mod logging;
pub mod report;
pub mod scan;

pub use config::{ConfigError, ScanConfig, SortKey};
pub use report::{
    render_table, sort_results, NotificationSink, NotifyError, NotifyOutcome, SlackNotifier,
};
pub use scan::{run_scan, ConsoleProgress, ScanProgress, ScanReport, ScanSummary, SilentProgress};
