use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Where a ticker sits on the risk/return plane.
///
/// Metrics are NaN when the ticker has too few defined returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskReturnProfile {
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    /// Un-annualised standard deviation of daily returns.
    pub daily_volatility: f64,
    /// Count of defined daily returns behind the metrics.
    pub observations: usize,
}

/// Orders profiles by Sharpe ratio, best first.
///
/// NaN ratios sink to the end. Ties keep ascending ticker order.
pub fn rank_by_sharpe(
    profiles: &BTreeMap<String, RiskReturnProfile>,
) -> Vec<(String, RiskReturnProfile)> {
    let mut ranked: Vec<_> = profiles
        .iter()
        .map(|(ticker, profile)| (ticker.clone(), *profile))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| descending_nan_last(a.sharpe_ratio, b.sharpe_ratio));
    ranked
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(sharpe: f64) -> RiskReturnProfile {
        RiskReturnProfile {
            annual_return: 0.1,
            annual_volatility: 0.2,
            sharpe_ratio: sharpe,
            daily_volatility: 0.01,
            observations: 10,
        }
    }

    #[test]
    fn best_sharpe_first_and_nan_last() {
        let mut profiles = BTreeMap::new();
        profiles.insert("AAA".to_string(), profile(f64::NAN));
        profiles.insert("BBB".to_string(), profile(0.5));
        profiles.insert("CCC".to_string(), profile(2.0));
        profiles.insert("DDD".to_string(), profile(-1.0));

        let order: Vec<_> = rank_by_sharpe(&profiles).into_iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["CCC", "BBB", "DDD", "AAA"]);
    }

    #[test]
    fn ties_keep_ticker_order() {
        let mut profiles = BTreeMap::new();
        profiles.insert("ZZ".to_string(), profile(1.0));
        profiles.insert("AA".to_string(), profile(1.0));
        let order: Vec<_> = rank_by_sharpe(&profiles).into_iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["AA", "ZZ"]);
    }

    #[test]
    fn undefined_metrics_serialize_as_null() {
        let json = serde_json::to_value(profile(f64::NAN)).unwrap();
        assert!(json["sharpe_ratio"].is_null());
        assert_eq!(json["observations"], 10);
    }
}
