//! # Market Watch Cross-Sectional Analyzer
//!
//! Compares several tickers at once: aligns them on shared dates, correlates
//! their returns, places them on the risk/return plane and scans them for
//! threshold alerts.
//!
//! Dates are always joined by value (an inner join), never matched by position.

use configuration::AlertThresholds;
use core_types::PriceField;
use features::{AnnotatedSeries, FeatureEngine};
use std::collections::BTreeMap;

pub mod alerts;
pub mod alignment;
pub mod correlation;
pub mod error;
pub mod profile;

pub use alerts::{Alert, low_correlation_pairs, scan_alerts};
pub use alignment::{AlignedTable, align, common_dates};
pub use correlation::{CorrelationMatrix, TickerPair, pearson};
pub use error::AnalyzerError;
pub use profile::{RiskReturnProfile, rank_by_sharpe};

/// The main cross-sectional analysis engine.
///
/// Annualisation and the risk-free rate follow the wrapped `FeatureEngine`, so
/// per-ticker and cross-sectional metrics agree.
#[derive(Debug, Clone, Default)]
pub struct CrossSectionalAnalyzer {
    engine: FeatureEngine,
}

impl CrossSectionalAnalyzer {
    pub fn new(engine: FeatureEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &FeatureEngine {
        &self.engine
    }

    /// Pivots `field` of every series onto their common dates.
    pub fn aligned_table(
        &self,
        series_by_ticker: &BTreeMap<String, AnnotatedSeries>,
        field: PriceField,
    ) -> Result<AlignedTable, AnalyzerError> {
        align(series_by_ticker, field)
    }

    /// Pearson correlation of daily returns over the inner-joined dates.
    pub fn correlation_matrix(
        &self,
        series_by_ticker: &BTreeMap<String, AnnotatedSeries>,
    ) -> Result<CorrelationMatrix, AnalyzerError> {
        let table = align(series_by_ticker, PriceField::DailyReturn)?;
        let matrix = CorrelationMatrix::from_table(&table);
        tracing::info!(
            "Computed {}x{} correlation matrix over {} common dates",
            matrix.len(),
            matrix.len(),
            matrix.observations()
        );
        Ok(matrix)
    }

    /// Annualised return, volatility and Sharpe ratio for each ticker.
    ///
    /// Each ticker is evaluated over its own full history; a ticker with too
    /// little data gets NaN metrics without affecting the others.
    pub fn risk_return_profile(
        &self,
        series_by_ticker: &BTreeMap<String, AnnotatedSeries>,
    ) -> BTreeMap<String, RiskReturnProfile> {
        let rf = self.engine.config().risk_free_rate;
        series_by_ticker
            .iter()
            .map(|(ticker, series)| {
                let returns = series.daily_return();
                let defined = features::indicators::defined(returns);
                let profile = RiskReturnProfile {
                    annual_return: self.engine.annual_return_of(returns),
                    annual_volatility: self.engine.volatility_of(returns),
                    sharpe_ratio: self.engine.sharpe_ratio_of(returns, rf),
                    daily_volatility: features::indicators::sample_std(&defined),
                    observations: defined.len(),
                };
                (ticker.clone(), profile)
            })
            .collect()
    }

    /// Risk/return profiles, best Sharpe ratio first.
    pub fn ranked_by_sharpe(
        &self,
        series_by_ticker: &BTreeMap<String, AnnotatedSeries>,
    ) -> Vec<(String, RiskReturnProfile)> {
        rank_by_sharpe(&self.risk_return_profile(series_by_ticker))
    }

    /// Alerts for every ticker, grouped by ticker in ascending order.
    pub fn alerts(
        &self,
        series_by_ticker: &BTreeMap<String, AnnotatedSeries>,
        thresholds: &AlertThresholds,
    ) -> Vec<Alert> {
        let window = self.engine.config().volatility_window;
        let alerts: Vec<Alert> = series_by_ticker
            .values()
            .flat_map(|series| scan_alerts(series, window, thresholds))
            .collect();
        if !alerts.is_empty() {
            tracing::info!(
                "Raised {} alerts across {} tickers",
                alerts.len(),
                series_by_ticker.len()
            );
        }
        alerts
    }

    /// Diversification candidates: pairs correlating below the threshold.
    pub fn low_correlation_pairs(
        &self,
        series_by_ticker: &BTreeMap<String, AnnotatedSeries>,
        thresholds: &AlertThresholds,
    ) -> Result<Vec<TickerPair>, AnalyzerError> {
        let matrix = self.correlation_matrix(series_by_ticker)?;
        Ok(low_correlation_pairs(&matrix, thresholds.low_correlation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use core_types::{TimeSeries, TimeSeriesRecord};

    fn annotate(ticker: &str, start_day: u32, closes: &[f64]) -> AnnotatedSeries {
        let records = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, start_day + i as u32).unwrap();
                TimeSeriesRecord::new(date, c, c, c, c, 500)
            })
            .collect();
        FeatureEngine::default().annotate(&TimeSeries::new(ticker, records))
    }

    fn universe() -> BTreeMap<String, AnnotatedSeries> {
        let mut map = BTreeMap::new();
        let msft = [100.0, 102.0, 101.0, 104.0, 103.0, 107.0];
        let aapl = [50.0, 51.0, 50.4, 52.1, 51.6, 53.5];
        let xom = [80.0, 79.0, 81.0, 80.0, 82.0, 79.5];
        map.insert("MSFT".to_string(), annotate("MSFT", 1, &msft));
        map.insert("AAPL".to_string(), annotate("AAPL", 1, &aapl));
        map.insert("XOM".to_string(), annotate("XOM", 1, &xom));
        map
    }

    #[test]
    fn correlation_matrix_orders_tickers_and_is_symmetric() {
        let analyzer = CrossSectionalAnalyzer::default();
        let matrix = analyzer.correlation_matrix(&universe()).unwrap();

        assert_eq!(matrix.tickers(), &["AAPL", "MSFT", "XOM"]);
        assert_eq!(matrix.get("AAPL", "AAPL"), Some(1.0));
        assert_eq!(matrix.get("AAPL", "XOM"), matrix.get("XOM", "AAPL"));
        // AAPL and MSFT move together in this sample.
        assert!(matrix.get("AAPL", "MSFT").unwrap() > 0.9);
    }

    #[test]
    fn series_correlates_perfectly_with_itself() {
        let mut map = BTreeMap::new();
        let series = annotate("A", 1, &[10.0, 11.0, 10.5, 12.0]);
        map.insert("A".to_string(), series.clone());
        map.insert("A_COPY".to_string(), series);

        let matrix = CrossSectionalAnalyzer::default().correlation_matrix(&map).unwrap();
        assert_relative_eq!(matrix.get("A", "A_COPY").unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn disjoint_histories_have_no_overlap() {
        let mut map = BTreeMap::new();
        map.insert("EARLY".to_string(), annotate("EARLY", 1, &[1.0, 2.0, 3.0]));
        map.insert("LATE".to_string(), annotate("LATE", 20, &[1.0, 2.0, 3.0]));
        let result = CrossSectionalAnalyzer::default().correlation_matrix(&map);
        assert!(matches!(result, Err(AnalyzerError::NoOverlap { .. })));
    }

    #[test]
    fn correlation_of_nothing_is_an_error() {
        let result = CrossSectionalAnalyzer::default().correlation_matrix(&BTreeMap::new());
        assert_eq!(result, Err(AnalyzerError::EmptyInput));
    }

    #[test]
    fn single_ticker_matrix_has_unit_diagonal() {
        let mut map = BTreeMap::new();
        map.insert("ONLY".to_string(), annotate("ONLY", 1, &[20.0, 21.0, 20.5, 22.0, 21.0]));

        let matrix = CrossSectionalAnalyzer::default().correlation_matrix(&map).unwrap();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.tickers(), &["ONLY"]);
        assert_eq!(matrix.get("ONLY", "ONLY"), Some(1.0));
        assert_eq!(matrix.observations(), 5);
        assert_eq!(matrix.pairs().count(), 0);
    }

    #[test]
    fn short_history_only_degrades_its_own_profile() {
        let mut map = universe();
        map.insert("NEW".to_string(), annotate("NEW", 1, &[10.0]));

        let profiles = CrossSectionalAnalyzer::default().risk_return_profile(&map);
        assert_eq!(profiles.len(), 4);
        assert!(profiles["NEW"].annual_return.is_nan());
        assert!(profiles["NEW"].sharpe_ratio.is_nan());
        assert_eq!(profiles["NEW"].observations, 0);
        assert!(profiles["MSFT"].sharpe_ratio.is_finite());
        assert_eq!(profiles["MSFT"].observations, 5);
    }

    #[test]
    fn profile_matches_engine_metrics() {
        let analyzer = CrossSectionalAnalyzer::default();
        let map = universe();
        let profiles = analyzer.risk_return_profile(&map);
        let msft = map["MSFT"].series();

        assert_relative_eq!(profiles["MSFT"].annual_return, analyzer.engine().annual_return(msft));
        assert_relative_eq!(profiles["MSFT"].annual_volatility, analyzer.engine().volatility(msft));
        assert_relative_eq!(
            profiles["MSFT"].annual_volatility,
            profiles["MSFT"].daily_volatility * 252f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn ranked_by_sharpe_puts_nan_last() {
        let mut map = universe();
        map.insert("NEW".to_string(), annotate("NEW", 1, &[10.0]));
        let ranked = CrossSectionalAnalyzer::default().ranked_by_sharpe(&map);
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked.last().map(|(t, _)| t.as_str()), Some("NEW"));
        assert!(ranked[0].1.sharpe_ratio >= ranked[1].1.sharpe_ratio);
    }

    #[test]
    fn low_correlation_pairs_are_diversifiers() {
        let thresholds = AlertThresholds::default();
        let pairs = CrossSectionalAnalyzer::default()
            .low_correlation_pairs(&universe(), &thresholds)
            .unwrap();
        assert!(pairs.iter().all(|p| p.correlation < thresholds.low_correlation));
        assert!(!pairs.iter().any(|p| p.first == "AAPL" && p.second == "MSFT"));
    }
}
