//! # Market Watch Series Store
//!
//! Discovers which tickers the archive holds and loads their daily OHLCV
//! history from one CSV file per ticker into canonical, date-ordered
//! [`core_types::TimeSeries`] values.
//!
//! ## Public API
//!
//! - `discover_tickers`: lists the tickers present under an archive directory.
//! - `SeriesStore`: loads single tickers or batches, with per-ticker memoisation.
//! - `StoreError`: the error taxonomy of this layer.

pub mod discovery;
pub mod error;
pub mod parser;
pub mod store;

pub use discovery::discover_tickers;
pub use error::StoreError;
pub use parser::ParseStats;
pub use store::{BatchLoad, LoadedSeries, SeriesStore, SkippedTicker};
