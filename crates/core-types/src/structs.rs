use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily OHLCV bar for a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    /// Carried through from the `Stock Splits` column untouched. No split
    /// adjustment is applied to prices.
    pub split_factor: f64,
}

impl TimeSeriesRecord {
    /// Builds a record with no split recorded for the day.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            split_factor: 0.0,
        }
    }
}

/// The full, date-ordered price history of one ticker.
///
/// Dates are unique and strictly increasing. The only way to build a
/// `TimeSeries` is through [`TimeSeries::new`], which canonicalises its input,
/// so every value of this type upholds that ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    ticker: String,
    records: Vec<TimeSeriesRecord>,
}

impl TimeSeries {
    /// Creates a series from records in arbitrary order.
    ///
    /// When two records share a date the one appearing later in `records` wins.
    pub fn new(ticker: impl Into<String>, records: Vec<TimeSeriesRecord>) -> Self {
        let (records, _) = canonicalize(records);
        Self {
            ticker: ticker.into(),
            records,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Returns the position of `date` in the series, if present.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.records.binary_search_by_key(&date, |r| r.date).ok()
    }

    /// Returns the sub-series whose dates fall within `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, CoreError> {
        if start > end {
            return Err(CoreError::InvalidDateRange { start, end });
        }
        let lo = self.records.partition_point(|r| r.date < start);
        let hi = self.records.partition_point(|r| r.date <= end);
        Ok(Self {
            ticker: self.ticker.clone(),
            records: self.records[lo..hi].to_vec(),
        })
    }
}

/// Sorts records by date and resolves duplicate dates by keeping the last-seen
/// record. Returns the canonical records and the number of duplicates dropped.
pub fn canonicalize(records: Vec<TimeSeriesRecord>) -> (Vec<TimeSeriesRecord>, usize) {
    let mut by_date = BTreeMap::new();
    let mut duplicates = 0;
    for record in records {
        if by_date.insert(record.date, record).is_some() {
            duplicates += 1;
        }
    }
    (by_date.into_values().collect(), duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bar(d: u32, close: f64) -> TimeSeriesRecord {
        TimeSeriesRecord::new(day(d), close, close, close, close, 100)
    }

    #[test]
    fn new_sorts_records_by_date() {
        let series = TimeSeries::new("X", vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0)]);
        assert_eq!(series.dates(), vec![day(1), day(2), day(3)]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_dates_keep_last_seen_row() {
        let (records, duplicates) = canonicalize(vec![bar(2, 10.0), bar(1, 1.0), bar(2, 20.0)]);
        assert_eq!(duplicates, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].close, 20.0);
    }

    #[test]
    fn between_is_inclusive() {
        let series = TimeSeries::new("X", (1..=10).map(|d| bar(d, d as f64)).collect());
        let slice = series.between(day(3), day(5)).unwrap();
        assert_eq!(slice.dates(), vec![day(3), day(4), day(5)]);
        assert_eq!(slice.ticker(), "X");
    }

    #[test]
    fn between_outside_range_is_empty() {
        let series = TimeSeries::new("X", vec![bar(1, 1.0), bar(2, 2.0)]);
        assert!(series.between(day(20), day(25)).unwrap().is_empty());
    }

    #[test]
    fn between_rejects_inverted_range() {
        let series = TimeSeries::new("X", vec![bar(1, 1.0)]);
        assert!(matches!(
            series.between(day(5), day(1)),
            Err(CoreError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn position_finds_existing_dates_only() {
        let series = TimeSeries::new("X", vec![bar(1, 1.0), bar(4, 4.0)]);
        assert_eq!(series.position(day(4)), Some(1));
        assert_eq!(series.position(day(2)), None);
    }

    #[test]
    fn record_serializes_with_iso_date() {
        let json = serde_json::to_string(&bar(1, 5.0)).unwrap();
        assert!(json.contains("\"date\":\"2024-01-01\""));
    }
}
