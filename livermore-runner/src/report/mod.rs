//! Presentation: console table and outbound notification.

pub mod slack;
pub mod table;

pub use slack::{
    build_payload, NotificationSink, NotifyError, NotifyOutcome, SlackNotifier, SCAN_TIME_FORMAT,
};
pub use table::{display_width, headers, render_table, sort_results};
