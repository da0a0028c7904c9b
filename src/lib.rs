//! # Market Watch
//!
//! Loads per-ticker OHLCV archives, derives return and risk features, and
//! compares tickers against each other.
//!
//! Data flows one way: the `SeriesStore` discovers and parses ticker files, the
//! `FeatureEngine` annotates each `TimeSeries`, and the
//! `CrossSectionalAnalyzer` aggregates annotated series. [`MarketWatch`] wires
//! the three together from a single `Settings` value.

use std::collections::BTreeMap;
use thiserror::Error;

pub use analyzer::{
    AlignedTable, Alert, AnalyzerError, CorrelationMatrix, CrossSectionalAnalyzer,
    RiskReturnProfile, TickerPair,
};
pub use configuration::{
    AlertThresholds, ConfigError, FeatureConfig, LoggingSettings, Settings, StorageSettings,
    Universe, init_tracing, load_config,
};
pub use core_types::{CoreError, PriceField, TimeSeries, TimeSeriesRecord};
pub use features::{AnnotatedSeries, FeatureEngine, FeatureError, SeriesSummary};
pub use series_store::{BatchLoad, ParseStats, SeriesStore, SkippedTicker, StoreError};

#[derive(Error, Debug)]
pub enum MarketWatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    #[error("Analysis error: {0}")]
    Analyzer(#[from] AnalyzerError),
}

/// The result of a multi-ticker operation, plus the tickers that could not be
/// loaded and were left out of it.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub value: T,
    pub skipped: Vec<SkippedTicker>,
}

impl<T> BatchOutcome<T> {
    pub fn skipped_tickers(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.ticker.as_str()).collect()
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> BatchOutcome<U> {
        BatchOutcome {
            value: f(self.value),
            skipped: self.skipped,
        }
    }

    fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<BatchOutcome<U>, E> {
        Ok(BatchOutcome {
            value: f(self.value)?,
            skipped: self.skipped,
        })
    }
}

/// Annotated series keyed by ticker.
pub type AnnotatedBatch = BatchOutcome<BTreeMap<String, AnnotatedSeries>>;

/// The single entry point collaborators use.
pub struct MarketWatch {
    settings: Settings,
    store: SeriesStore,
    engine: FeatureEngine,
    analyzer: CrossSectionalAnalyzer,
}

impl MarketWatch {
    /// Opens the archive named in `settings` and builds the engines.
    pub fn new(settings: Settings) -> Result<Self, MarketWatchError> {
        settings.validate()?;
        let store = SeriesStore::open(&settings.storage)?;
        let engine = FeatureEngine::new(settings.features.clone());
        let analyzer = CrossSectionalAnalyzer::new(engine.clone());
        tracing::info!(
            "Market watch ready: {} tickers under {}",
            store.list_tickers().len(),
            store.root().display()
        );
        Ok(Self {
            settings,
            store,
            engine,
            analyzer,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &FeatureEngine {
        &self.engine
    }

    pub fn analyzer(&self) -> &CrossSectionalAnalyzer {
        &self.analyzer
    }

    pub fn store(&mut self) -> &mut SeriesStore {
        &mut self.store
    }

    pub fn list_tickers(&self) -> &[String] {
        self.store.list_tickers()
    }

    /// Re-scans the archive and drops every cached series.
    pub fn refresh(&mut self) -> Result<&[String], MarketWatchError> {
        Ok(self.store.refresh()?)
    }

    /// Reads one ticker's file again, replacing any cached copy.
    pub fn reload(&mut self, ticker: &str) -> Result<TimeSeries, MarketWatchError> {
        Ok(self.store.reload(ticker)?)
    }

    /// Drops the cached copy of `ticker`. Returns whether one existed.
    pub fn invalidate(&mut self, ticker: &str) -> bool {
        self.store.invalidate(ticker)
    }

    pub fn load(&mut self, ticker: &str) -> Result<TimeSeries, MarketWatchError> {
        Ok(self.store.load(ticker)?)
    }

    pub fn load_many<I, S>(&mut self, tickers: I) -> Result<BatchLoad, MarketWatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.store.load_many(tickers)?)
    }

    /// Loads and annotates one ticker with the configured windows.
    pub fn annotate(&mut self, ticker: &str) -> Result<AnnotatedSeries, MarketWatchError> {
        let series = self.store.load(ticker)?;
        Ok(self.engine.annotate(&series))
    }

    /// Loads and annotates several tickers, skipping the ones that fail alone.
    pub fn annotate_many<I, S>(&mut self, tickers: I) -> Result<AnnotatedBatch, MarketWatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.store.load_many(tickers)?;
        let series = batch
            .series
            .iter()
            .map(|(ticker, s)| (ticker.clone(), self.engine.annotate(s)))
            .collect();
        Ok(BatchOutcome {
            value: series,
            skipped: batch.skipped,
        })
    }

    pub fn summary(&mut self, ticker: &str) -> Result<SeriesSummary, MarketWatchError> {
        let series = self.store.load(ticker)?;
        Ok(self.engine.summary(&series))
    }

    pub fn correlation_matrix<I, S>(
        &mut self,
        tickers: I,
    ) -> Result<BatchOutcome<CorrelationMatrix>, MarketWatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.annotate_many(tickers)?;
        Ok(batch.try_map(|series| self.analyzer.correlation_matrix(&series))?)
    }

    pub fn risk_return_profile<I, S>(
        &mut self,
        tickers: I,
    ) -> Result<BatchOutcome<BTreeMap<String, RiskReturnProfile>>, MarketWatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.annotate_many(tickers)?;
        Ok(batch.map(|series| self.analyzer.risk_return_profile(&series)))
    }

    pub fn ranked_profiles<I, S>(
        &mut self,
        tickers: I,
    ) -> Result<BatchOutcome<Vec<(String, RiskReturnProfile)>>, MarketWatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.annotate_many(tickers)?;
        Ok(batch.map(|series| self.analyzer.ranked_by_sharpe(&series)))
    }

    /// Threshold alerts for the given tickers, using the configured thresholds.
    pub fn alerts<I, S>(
        &mut self,
        tickers: I,
    ) -> Result<BatchOutcome<Vec<Alert>>, MarketWatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.annotate_many(tickers)?;
        Ok(batch.map(|series| self.analyzer.alerts(&series, &self.settings.alerts)))
    }

    pub fn low_correlation_pairs<I, S>(
        &mut self,
        tickers: I,
    ) -> Result<BatchOutcome<Vec<TickerPair>>, MarketWatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.annotate_many(tickers)?;
        let thresholds = &self.settings.alerts;
        Ok(batch.try_map(|series| self.analyzer.low_correlation_pairs(&series, thresholds))?)
    }

    pub fn sector(&self, name: &str) -> Vec<String> {
        self.settings.universe.sector(name)
    }

    pub fn preset(&self, name: &str) -> Vec<String> {
        self.settings.universe.preset(name)
    }
}
