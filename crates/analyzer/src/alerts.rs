use crate::correlation::{CorrelationMatrix, TickerPair};
use chrono::NaiveDate;
use configuration::AlertThresholds;
use features::AnnotatedSeries;
use features::indicators::rolling_std;
use serde::Serialize;

/// A notable event in one ticker's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Alert {
    /// A single-day move larger than the extreme-return threshold, either way.
    ExtremeReturn {
        ticker: String,
        date: NaiveDate,
        daily_return: f64,
    },
    /// Rolling daily volatility above the high-volatility threshold.
    HighVolatility {
        ticker: String,
        date: NaiveDate,
        volatility: f64,
        window: usize,
    },
}

impl Alert {
    pub fn ticker(&self) -> &str {
        match self {
            Alert::ExtremeReturn { ticker, .. } | Alert::HighVolatility { ticker, .. } => ticker,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Alert::ExtremeReturn { date, .. } | Alert::HighVolatility { date, .. } => *date,
        }
    }
}

/// Scans one annotated series for threshold breaches.
///
/// Volatility is read from the series when `window` was computed during
/// annotation and derived from its daily returns otherwise. Alerts come out in
/// date order, an extreme return before a volatility alert on the same day.
pub fn scan_alerts(
    series: &AnnotatedSeries,
    window: usize,
    thresholds: &AlertThresholds,
) -> Vec<Alert> {
    let volatility = match series.rolling_volatility(window) {
        Ok(column) => column.to_vec(),
        Err(_) => rolling_std(series.daily_return(), window),
    };

    let mut alerts = Vec::new();
    for (i, record) in series.records().iter().enumerate() {
        if let Some(r) = series.daily_return()[i] {
            if r.abs() > thresholds.extreme_return {
                alerts.push(Alert::ExtremeReturn {
                    ticker: series.ticker().to_string(),
                    date: record.date,
                    daily_return: r,
                });
            }
        }
        if let Some(v) = volatility[i] {
            if v > thresholds.high_volatility {
                alerts.push(Alert::HighVolatility {
                    ticker: series.ticker().to_string(),
                    date: record.date,
                    volatility: v,
                    window,
                });
            }
        }
    }
    alerts
}

/// Pairs whose correlation is below `threshold`, weakest first.
///
/// Undefined (NaN) correlations are left out.
pub fn low_correlation_pairs(matrix: &CorrelationMatrix, threshold: f64) -> Vec<TickerPair> {
    let mut pairs: Vec<_> = matrix
        .pairs()
        .filter(|p| !p.correlation.is_nan() && p.correlation < threshold)
        .collect();
    pairs.sort_by(|a, b| a.correlation.total_cmp(&b.correlation));
    pairs
}
