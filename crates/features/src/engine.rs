use crate::indicators::{self, defined, mean, sample_std};
use crate::report::SeriesSummary;
use crate::series::AnnotatedSeries;
use configuration::FeatureConfig;
use core_types::TimeSeries;
use std::collections::{BTreeMap, BTreeSet};

/// A stateless calculator for deriving features from a ticker's price history.
///
/// The only thing it holds is its `FeatureConfig`, so engines with different
/// conventions can be used side by side.
#[derive(Debug, Clone, Default)]
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// The main entry point for feature engineering.
    ///
    /// Computes every derived column for the configured windows.
    ///
    /// # Arguments
    ///
    /// * `series` - A loaded, date-ordered price history.
    ///
    /// # Returns
    ///
    /// An `AnnotatedSeries` carrying a copy of `series` and its feature
    /// columns. Windows longer than the history produce all-undefined columns.
    pub fn annotate(&self, series: &TimeSeries) -> AnnotatedSeries {
        self.annotate_with_windows(series, &self.config.windows)
    }

    /// Like [`FeatureEngine::annotate`], with an explicit window set.
    pub fn annotate_with_windows(&self, series: &TimeSeries, windows: &[usize]) -> AnnotatedSeries {
        let closes = series.closes();
        let daily_return = indicators::daily_returns(&closes);
        let cumulative_return = indicators::cumulative_returns(&daily_return);

        let windows: BTreeSet<usize> = windows.iter().copied().collect();
        let moving_averages: BTreeMap<_, _> = windows
            .iter()
            .map(|&w| (w, indicators::moving_average(&closes, w)))
            .collect();
        let rolling_volatility: BTreeMap<_, _> = windows
            .iter()
            .map(|&w| (w, indicators::rolling_std(&daily_return, w)))
            .collect();

        tracing::debug!(
            "Annotated {} ({} records, windows {:?})",
            series.ticker(),
            series.len(),
            windows
        );

        AnnotatedSeries::new(
            series.clone(),
            daily_return,
            cumulative_return,
            moving_averages,
            rolling_volatility,
        )
    }

    pub fn daily_return(&self, series: &TimeSeries) -> Vec<Option<f64>> {
        indicators::daily_returns(&series.closes())
    }

    pub fn cumulative_return(&self, series: &TimeSeries) -> Vec<Option<f64>> {
        indicators::cumulative_returns(&self.daily_return(series))
    }

    pub fn moving_average(&self, series: &TimeSeries, window: usize) -> Vec<Option<f64>> {
        indicators::moving_average(&series.closes(), window)
    }

    pub fn rolling_volatility(&self, series: &TimeSeries, window: usize) -> Vec<Option<f64>> {
        indicators::rolling_std(&self.daily_return(series), window)
    }

    /// Mean daily return times the trading days per year.
    ///
    /// This is the arithmetic convention, not compounded growth; see
    /// [`FeatureEngine::compound_annual_growth_rate`] for the geometric one.
    pub fn annual_return(&self, series: &TimeSeries) -> f64 {
        self.annual_return_of(&self.daily_return(series))
    }

    /// Annualised sample standard deviation of daily returns.
    pub fn volatility(&self, series: &TimeSeries) -> f64 {
        self.volatility_of(&self.daily_return(series))
    }

    /// Annualised Sharpe ratio at the configured risk-free rate.
    pub fn sharpe_ratio(&self, series: &TimeSeries) -> f64 {
        self.sharpe_ratio_with(series, self.config.risk_free_rate)
    }

    /// Annualised Sharpe ratio at an explicit per-day risk-free rate.
    pub fn sharpe_ratio_with(&self, series: &TimeSeries, risk_free_rate: f64) -> f64 {
        self.sharpe_ratio_of(&self.daily_return(series), risk_free_rate)
    }

    pub fn annual_return_of(&self, returns: &[Option<f64>]) -> f64 {
        mean(&defined(returns)) * self.trading_days()
    }

    pub fn volatility_of(&self, returns: &[Option<f64>]) -> f64 {
        sample_std(&defined(returns)) * self.trading_days().sqrt()
    }

    /// NaN when fewer than two returns are defined or they do not vary.
    pub fn sharpe_ratio_of(&self, returns: &[Option<f64>], risk_free_rate: f64) -> f64 {
        let returns = defined(returns);
        let std_dev = sample_std(&returns);
        if !std_dev.is_finite() || std_dev == 0.0 {
            return f64::NAN;
        }
        (mean(&returns) - risk_free_rate) / std_dev * self.trading_days().sqrt()
    }

    /// Geometric annualisation of the whole-period return:
    /// `(last / first) ^ (trading_days / records) - 1`.
    pub fn compound_annual_growth_rate(&self, series: &TimeSeries) -> f64 {
        let records = series.records();
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return f64::NAN;
        };
        if records.len() < 2 {
            return f64::NAN;
        }
        let years = records.len() as f64 / self.trading_days();
        (last.close / first.close).powf(1.0 / years) - 1.0
    }

    /// Collects the headline metrics for one ticker.
    pub fn summary(&self, series: &TimeSeries) -> SeriesSummary {
        let returns = self.daily_return(series);
        let closes = series.closes();
        let last_change_pct = match closes.as_slice() {
            [.., prev, last] => Some((last - prev) / prev * 100.0),
            _ => None,
        };

        SeriesSummary {
            ticker: series.ticker().to_string(),
            first_date: series.first_date(),
            last_date: series.last_date(),
            observations: series.len(),
            last_close: closes.last().copied(),
            last_change_pct,
            annual_return: self.annual_return_of(&returns),
            annual_volatility: self.volatility_of(&returns),
            sharpe_ratio: self.sharpe_ratio_of(&returns, self.config.risk_free_rate),
            cagr: self.compound_annual_growth_rate(series),
        }
    }

    fn trading_days(&self) -> f64 {
        self.config.trading_days_per_year as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::NaiveDate;
    use core_types::TimeSeriesRecord;

    fn series(closes: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let records = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = start + chrono::Days::new(i as u64);
                TimeSeriesRecord::new(date, c, c, c, c, 1_000)
            })
            .collect();
        TimeSeries::new("X", records)
    }

    /// A deterministic, gently trending zig-zag.
    fn wavy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + i as f64 * 0.3 + if i % 2 == 0 { 1.5 } else { -1.0 })
            .collect()
    }

    #[test]
    fn scenario_returns_for_three_closes() {
        let engine = FeatureEngine::default();
        let s = series(&[100.0, 110.0, 99.0]);
        let daily = engine.daily_return(&s);
        let cumulative = engine.cumulative_return(&s);

        assert_eq!(daily[0], None);
        assert_relative_eq!(daily[1].unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(daily[2].unwrap(), -0.10, epsilon = 1e-12);
        assert_eq!(cumulative[0], None);
        assert_relative_eq!(cumulative[1].unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(cumulative[2].unwrap(), -0.01, epsilon = 1e-12);
    }

    #[test]
    fn cumulative_return_reconstructs_prices() {
        let engine = FeatureEngine::default();
        let closes = wavy(300);
        let s = series(&closes);
        for (i, c) in engine.cumulative_return(&s).iter().enumerate() {
            if let Some(c) = c {
                assert_relative_eq!(closes[0] * (1.0 + c), closes[i], max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn moving_average_matches_trailing_mean() {
        let engine = FeatureEngine::default();
        let closes = wavy(120);
        let s = series(&closes);
        let ma = engine.moving_average(&s, 20);
        for (i, value) in ma.iter().enumerate() {
            if i < 19 {
                assert_eq!(*value, None);
            } else {
                let expected = closes[i + 1 - 20..=i].iter().sum::<f64>() / 20.0;
                assert_relative_eq!(value.unwrap(), expected, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn unit_window_moving_average_is_close() {
        let engine = FeatureEngine::default();
        let closes = wavy(50);
        let ma = engine.moving_average(&series(&closes), 1);
        let ma: Vec<f64> = ma.into_iter().map(Option::unwrap).collect();
        assert_eq!(ma, closes);
    }

    #[test]
    fn rolling_volatility_starts_after_full_window_of_returns() {
        let engine = FeatureEngine::default();
        let s = series(&wavy(40));
        let vol = engine.rolling_volatility(&s, 10);
        assert!(vol[..10].iter().all(Option::is_none));
        assert!(vol[10..].iter().all(|v| v.is_some_and(|v| v > 0.0)));
    }

    #[test]
    fn scalar_metrics_follow_their_formulas() {
        let engine = FeatureEngine::default();
        let s = series(&wavy(60));
        let returns = defined(&engine.daily_return(&s));
        let m = mean(&returns);
        let sd = sample_std(&returns);

        assert_relative_eq!(engine.annual_return(&s), m * 252.0, max_relative = 1e-12);
        assert_relative_eq!(engine.volatility(&s), sd * 252f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(engine.sharpe_ratio(&s), m / sd * 252f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(
            engine.sharpe_ratio_with(&s, 0.0001),
            (m - 0.0001) / sd * 252f64.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn risk_free_rate_comes_from_config() {
        let s = series(&wavy(60));
        let base = FeatureEngine::default();
        let with_rate = FeatureEngine::new(FeatureConfig::default().with_risk_free_rate(0.0002));
        assert_relative_eq!(
            with_rate.sharpe_ratio(&s),
            base.sharpe_ratio_with(&s, 0.0002),
            max_relative = 1e-12
        );
    }

    #[test]
    fn annual_return_is_arithmetic_not_geometric() {
        // Deliberately pinned: the annualised return multiplies the mean daily
        // return by 252 and must not be swapped for compounded growth.
        let engine = FeatureEngine::default();
        let s = series(&[100.0, 110.0, 99.0]);
        let arithmetic = (0.10 + -0.10) / 2.0 * 252.0;
        assert_abs_diff_eq!(engine.annual_return(&s), arithmetic, epsilon = 1e-9);

        let geometric = engine.compound_annual_growth_rate(&s);
        assert_relative_eq!(geometric, 0.99f64.powf(252.0 / 3.0) - 1.0, max_relative = 1e-9);
        assert!((engine.annual_return(&s) - geometric).abs() > 0.5);
    }

    #[test]
    fn single_record_series_degrades_to_missing_data() {
        let engine = FeatureEngine::default();
        let s = series(&[42.0]);
        assert!(engine.sharpe_ratio(&s).is_nan());
        assert!(engine.volatility(&s).is_nan());
        assert!(engine.annual_return(&s).is_nan());
        assert!(engine.compound_annual_growth_rate(&s).is_nan());

        let annotated = engine.annotate_with_windows(&s, &[2, 20, 50, 200]);
        for w in annotated.windows() {
            assert_eq!(annotated.moving_average(w).unwrap(), &[None]);
            assert_eq!(annotated.rolling_volatility(w).unwrap(), &[None]);
        }
    }

    #[test]
    fn empty_series_is_tolerated() {
        let engine = FeatureEngine::default();
        let s = TimeSeries::new("EMPTY", Vec::new());
        let annotated = engine.annotate(&s);
        assert!(annotated.is_empty());
        assert!(annotated.daily_return().is_empty());
        assert!(engine.sharpe_ratio(&s).is_nan());
        let summary = engine.summary(&s);
        assert_eq!(summary.last_close, None);
        assert_eq!(summary.last_change_pct, None);
    }

    #[test]
    fn flat_prices_have_nan_sharpe() {
        let engine = FeatureEngine::default();
        let s = series(&[10.0; 30]);
        assert!(engine.sharpe_ratio(&s).is_nan());
        assert_eq!(engine.volatility(&s), 0.0);
        assert_eq!(engine.annual_return(&s), 0.0);
    }

    #[test]
    fn annotate_uses_configured_windows() {
        let engine = FeatureEngine::default();
        let annotated = engine.annotate(&series(&wavy(100)));
        assert_eq!(annotated.windows(), vec![20, 50, 200]);
        assert!(annotated.moving_average(200).unwrap().iter().all(Option::is_none));
        assert!(annotated.moving_average(50).unwrap()[49].is_some());
        assert!(annotated.moving_average(30).is_err());
    }

    #[test]
    fn annotate_is_idempotent_and_leaves_prices_alone() {
        let engine = FeatureEngine::default();
        let s = series(&wavy(250));
        let first = engine.annotate(&s);
        let second = engine.annotate(first.series());
        assert_eq!(first, second);
        assert_eq!(first.series(), &s);
    }

    #[test]
    fn summary_reports_last_change() {
        let engine = FeatureEngine::default();
        let summary = engine.summary(&series(&[100.0, 110.0, 99.0]));
        assert_eq!(summary.observations, 3);
        assert_eq!(summary.last_close, Some(99.0));
        assert_relative_eq!(summary.last_change_pct.unwrap(), -10.0, epsilon = 1e-9);
        assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2020, 1, 1));
    }
}
