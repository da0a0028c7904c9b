use chrono::NaiveDate;
use serde::Serialize;

/// The headline metrics of a single ticker, as shown above its price chart.
///
/// Ratio fields are NaN when the history is too short to define them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub ticker: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub observations: usize,

    // I. Price
    pub last_close: Option<f64>,
    /// Percentage change of the last close against the one before it.
    pub last_change_pct: Option<f64>,

    // II. Annualised metrics
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    /// Geometric annualisation, reported next to the arithmetic `annual_return`.
    pub cagr: f64,
}
