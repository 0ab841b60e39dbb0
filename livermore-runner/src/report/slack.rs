//! Slack incoming-webhook notification.
//!
//! The message is a Block Kit payload: a header, the scan time and match
//! count side by side, the strategy rules, a divider, the rendered table in a
//! code block (keeps columns aligned on mobile), and a disclaimer. Delivery is
//! attempted once; a non-2xx answer is reported and never retried.

use std::time::Duration;

use chrono::Local;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Timestamp layout shown in the message.
pub const SCAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADER_TEXT: &str = "🚀 Taiwan Strong Breakout Signals (Livermore Breakout)";
const DISCLAIMER: &str = "⚠️ *Disclaimer*: For trading research and educational use only. \
     Not investment advice. Markets carry risk.";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http client: {0}")]
    Client(String),

    #[error("webhook request failed: {0}")]
    Request(String),

    #[error("webhook rejected message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// No destination configured; nothing was attempted.
    Skipped,
}

/// Destination for a finished scan's table.
pub trait NotificationSink {
    fn notify(
        &self,
        table: &str,
        match_count: usize,
        lookback_days: usize,
    ) -> Result<NotifyOutcome, NotifyError>;
}

/// Block Kit message for one scan.
pub fn build_payload(table: &str, match_count: usize, lookback_days: usize, scan_time: &str) -> Value {
    json!({
        "blocks": [
            {
                "type": "header",
                "text": { "type": "plain_text", "text": HEADER_TEXT, "emoji": true }
            },
            {
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*📅 Scan time:*\n{scan_time}") },
                    { "type": "mrkdwn", "text": format!("*🎯 Matches:*\n{match_count}") }
                ]
            },
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*🔎 Strategy:*\n• Close above every moving average\n\
                         • At least two consecutive up days\n\
                         • Close above the {lookback_days}-day high"
                    )
                }
            },
            { "type": "divider" },
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("```{table}```") }
            },
            {
                "type": "context",
                "elements": [ { "type": "mrkdwn", "text": DISCLAIMER } ]
            }
        ]
    })
}

pub struct SlackNotifier {
    client: reqwest::blocking::Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    /// `None` builds a notifier that always skips.
    pub fn new(webhook_url: Option<String>) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;
        Ok(Self {
            client,
            webhook_url,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

impl NotificationSink for SlackNotifier {
    fn notify(
        &self,
        table: &str,
        match_count: usize,
        lookback_days: usize,
    ) -> Result<NotifyOutcome, NotifyError> {
        let Some(url) = self.webhook_url.as_deref() else {
            debug!("no webhook configured, skipping notification");
            return Ok(NotifyOutcome::Skipped);
        };

        let scan_time = Local::now().format(SCAN_TIME_FORMAT).to_string();
        let payload = build_payload(table, match_count, lookback_days, &scan_time);

        let resp = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            warn!(status = status.as_u16(), "slack webhook rejected message");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(NotifyOutcome::Sent)
    }
}
