//! Domain types for the breakout scanner

pub mod bar;
pub mod ids;
pub mod instrument;
pub mod series;

pub use bar::{Bar, BarError};
pub use ids::DatasetHash;
pub use instrument::{Instrument, InstrumentMeta, Venue};
pub use series::PriceSeries;
