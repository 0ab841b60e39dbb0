//! Yahoo Finance chart API provider.
//!
//! Fetches daily OHLC bars from the v8 chart endpoint with bounded retries,
//! exponential backoff and a shared circuit breaker. The same endpoint's
//! `meta` block also carries the instrument's long name, which the metadata
//! chain uses as its last lookup before falling back to the raw symbol.
//!
//! Only a 403 ban opens the circuit breaker. Throttling and server errors
//! are retried with backoff and then reported for that symbol alone.
//!
//! Yahoo has no official API and changes its format without notice; every
//! parse failure surfaces as [`DataError::ResponseFormatChanged`].

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;
use chrono::{NaiveDate, NaiveTime};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const CHART_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Query window for one chart request.
enum ChartQuery {
    Range { start: NaiveDate, end: NaiveDate },
    /// Smallest request that still returns `meta`.
    MetaOnly,
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: CHART_ENDPOINT.to_string(),
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    #[cfg(test)]
    fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    /// Point at a local chart server.
    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn query_params(query: &ChartQuery) -> Vec<(&'static str, String)> {
        match query {
            ChartQuery::Range { start, end } => {
                let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
                // Inclusive end: last second of the end date.
                let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_399;
                vec![
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", "1d".into()),
                ]
            }
            ChartQuery::MetaOnly => vec![("range", "1d".into()), ("interval", "1d".into())],
        }
    }

    /// Unwrap the first chart result or map Yahoo's error block.
    fn first_result(symbol: &str, resp: ChartResponse) -> Result<ChartData, DataError> {
        let results = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        results
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))
    }

    fn parse_bars(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
        let data = Self::first_result(symbol, resp)?;

        // A symbol with no sessions in range comes back without timestamps.
        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data
            .indicators
            .and_then(|ind| ind.quote.into_iter().next())
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let field = |column: &[Option<f64>]| column.get(i).copied().flatten();
            let (open, high, low, close) = (
                field(&quote.open),
                field(&quote.high),
                field(&quote.low),
                field(&quote.close),
            );

            // Holidays come back as all-null rows.
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }

            bars.push(Bar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: quote
                    .volume
                    .as_ref()
                    .and_then(|v| v.get(i).copied().flatten())
                    .unwrap_or(0),
            });
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }

    fn parse_long_name(symbol: &str, resp: ChartResponse) -> Result<Option<String>, DataError> {
        let meta = Self::first_result(symbol, resp)?.meta;
        Ok(meta
            .and_then(|m| m.long_name.or(m.short_name))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }

    /// One chart request with retry and circuit breaker logic.
    fn request_chart(&self, symbol: &str, query: &ChartQuery) -> Result<ChartResponse, DataError> {
        if !self.circuit_breaker.is_allowed() {
            debug!(
                symbol,
                cooldown_secs = self.circuit_breaker.remaining_cooldown().as_secs(),
                "provider banned, request refused"
            );
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = format!("{}/{symbol}", self.endpoint);
        let params = Self::query_params(query);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying chart request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).query(&params).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            match status {
                StatusCode::FORBIDDEN => {
                    self.circuit_breaker.trip();
                    return Err(DataError::CircuitBreakerTripped);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after_secs = resp
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(60);
                    last_error = Some(DataError::RateLimited { retry_after_secs });
                    continue;
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(DataError::AuthenticationRequired(
                        "Yahoo Finance requires authentication".into(),
                    ));
                }
                // Yahoo answers unknown symbols with 404 plus a JSON error body.
                StatusCode::NOT_FOUND => {
                    return Err(DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    });
                }
                s if !s.is_success() => {
                    last_error = Some(DataError::Other(format!("HTTP {s} for {symbol}")));
                    continue;
                }
                _ => {}
            }

            let chart: ChartResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol}: {e}"
                ))
            })?;
            return Ok(chart);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    /// Long display name from the chart metadata, if Yahoo has one.
    pub fn long_name(&self, symbol: &str) -> Result<Option<String>, DataError> {
        let resp = self.request_chart(symbol, &ChartQuery::MetaOnly)?;
        Self::parse_long_name(symbol, resp)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let resp = self.request_chart(symbol, &ChartQuery::Range { start, end })?;
        let bars = Self::parse_bars(symbol, resp)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
