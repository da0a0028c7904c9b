//! # Market Watch Feature Engine
//!
//! Derives return, trend and risk features from a ticker's price history.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of files or storage. It takes a
//!   `TimeSeries` and produces derived values.
//! - **Explicit Conventions:** Windows, the risk-free rate and the annualisation
//!   factor come from a `FeatureConfig` held by the `FeatureEngine`, never from
//!   global state.
//! - **Degrade, Don't Fail:** Insufficient history yields undefined (`None`)
//!   column entries or NaN ratios instead of errors.
//!
//! ## Public API
//!
//! - `FeatureEngine`: computes single features, scalar metrics and full annotations.
//! - `AnnotatedSeries`: a price history with typed access to its feature columns.
//! - `SeriesSummary`: the headline metrics of one ticker.
//! - `FeatureError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod indicators;
pub mod report;
pub mod series;

// Re-export the key components to create a clean, public-facing API.
pub use engine::FeatureEngine;
pub use error::FeatureError;
pub use report::SeriesSummary;
pub use series::{AnnotatedRow, AnnotatedSeries};
