//! Price series providers and ingestion.

pub mod circuit_breaker;
pub mod csv_import;
pub mod ingest;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use csv_import::CsvProvider;
pub use ingest::ingest;
pub use provider::{history_window, DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
