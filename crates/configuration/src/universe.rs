use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Named groups of tickers the front-end offers as one-click selections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
    pub presets: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// Tickers of a sector. Unknown sectors yield an empty list.
    ///
    /// Names are matched case-insensitively since the `config` loader may
    /// normalise key case.
    pub fn sector(&self, name: &str) -> Vec<String> {
        lookup(&self.sectors, name)
    }

    /// Tickers of a preset. Unknown presets yield an empty list.
    pub fn preset(&self, name: &str) -> Vec<String> {
        lookup(&self.presets, name)
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(String::as_str).collect()
    }

    pub fn preset_names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// Every ticker listed in any sector, sorted and de-duplicated.
    pub fn all_tickers(&self) -> Vec<String> {
        self.sectors
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn lookup(groups: &BTreeMap<String, Vec<String>>, name: &str) -> Vec<String> {
    groups
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, tickers)| tickers.clone())
        .unwrap_or_default()
}

fn group(entries: Vec<(&str, Vec<&str>)>) -> BTreeMap<String, Vec<String>> {
    entries
        .into_iter()
        .map(|(name, tickers)| {
            (
                name.to_string(),
                tickers.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for Universe {
    fn default() -> Self {
        let sectors = group(vec![
            (
                "Technology",
                vec!["AAPL", "MSFT", "GOOGL", "NVDA", "AMD", "INTC", "CSCO", "ORCL", "ADBE", "CRM"],
            ),
            (
                "Finance",
                vec!["JPM", "BAC", "GS", "MS", "BLK", "SCHW", "AXP", "MA", "V", "DFS"],
            ),
            (
                "Healthcare",
                vec!["JNJ", "UNH", "PFE", "ABBV", "TMO", "MRK", "AMGN", "LLY", "GILD", "BIIB"],
            ),
            (
                "Energy",
                vec!["XOM", "CVX", "COP", "EOG", "SLB", "MPC", "PSX", "VLO", "HES", "OKE"],
            ),
            (
                "Consumer",
                vec!["AMZN", "WMT", "HD", "MCD", "NKE", "COST", "TJX", "DIS", "SBUX", "TSLA"],
            ),
            (
                "Industrials",
                vec!["BA", "CAT", "MMM", "DE", "LMT", "RTX", "GE", "HON", "ITW", "LUV"],
            ),
        ]);
        let presets = group(vec![
            ("FAANG", vec!["AAPL", "AMZN", "GOOGL", "META", "NVDA"]),
            ("Tech Giants", vec!["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"]),
            ("Banks", vec!["JPM", "BAC", "GS", "MS", "BLK"]),
            ("All Sectors", vec!["AAPL", "JPM", "JNJ", "XOM", "AMZN", "BA"]),
        ]);
        Self { sectors, presets }
    }
}
