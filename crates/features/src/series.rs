use crate::error::FeatureError;
use chrono::NaiveDate;
use core_types::{TimeSeries, TimeSeriesRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// A ticker's price history together with its derived feature columns.
///
/// Every column has one entry per record. `None` marks positions where the
/// feature is undefined (the first daily return, warm-up of a window).
/// Features are reached through typed accessors rather than by column name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedSeries {
    series: TimeSeries,
    daily_return: Vec<Option<f64>>,
    cumulative_return: Vec<Option<f64>>,
    moving_averages: BTreeMap<usize, Vec<Option<f64>>>,
    rolling_volatility: BTreeMap<usize, Vec<Option<f64>>>,
}

/// A borrowed view of one date of an [`AnnotatedSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedRow<'a> {
    pub record: &'a TimeSeriesRecord,
    pub daily_return: Option<f64>,
    pub cumulative_return: Option<f64>,
}

impl AnnotatedSeries {
    pub(crate) fn new(
        series: TimeSeries,
        daily_return: Vec<Option<f64>>,
        cumulative_return: Vec<Option<f64>>,
        moving_averages: BTreeMap<usize, Vec<Option<f64>>>,
        rolling_volatility: BTreeMap<usize, Vec<Option<f64>>>,
    ) -> Self {
        Self {
            series,
            daily_return,
            cumulative_return,
            moving_averages,
            rolling_volatility,
        }
    }

    pub fn ticker(&self) -> &str {
        self.series.ticker()
    }

    /// The untouched OHLCV history the features were derived from.
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        self.series.records()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series.dates()
    }

    pub fn daily_return(&self) -> &[Option<f64>] {
        &self.daily_return
    }

    pub fn cumulative_return(&self) -> &[Option<f64>] {
        &self.cumulative_return
    }

    pub fn moving_average(&self, window: usize) -> Result<&[Option<f64>], FeatureError> {
        self.moving_averages
            .get(&window)
            .map(Vec::as_slice)
            .ok_or(FeatureError::WindowNotComputed(window))
    }

    pub fn rolling_volatility(&self, window: usize) -> Result<&[Option<f64>], FeatureError> {
        self.rolling_volatility
            .get(&window)
            .map(Vec::as_slice)
            .ok_or(FeatureError::WindowNotComputed(window))
    }

    /// Windows that moving-average columns exist for, ascending.
    pub fn windows(&self) -> Vec<usize> {
        self.moving_averages.keys().copied().collect()
    }

    /// The daily return on `date`, if the date is present and the return defined.
    pub fn daily_return_on(&self, date: NaiveDate) -> Option<f64> {
        self.series
            .position(date)
            .and_then(|i| self.daily_return[i])
    }

    pub fn rows(&self) -> impl Iterator<Item = AnnotatedRow<'_>> {
        self.series
            .records()
            .iter()
            .zip(&self.daily_return)
            .zip(&self.cumulative_return)
            .map(|((record, daily_return), cumulative_return)| AnnotatedRow {
                record,
                daily_return: *daily_return,
                cumulative_return: *cumulative_return,
            })
    }

    /// Restricts the series and every column to `[start, end]`.
    ///
    /// Feature values are kept as computed over the full history, so a
    /// 200-day average on the first day of the slice still reflects the days
    /// before it.
    pub fn between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AnnotatedSeries, FeatureError> {
        let sliced = self.series.between(start, end)?;
        let lo = self.series.records().partition_point(|r| r.date < start);
        let hi = lo + sliced.len();
        let cut = |column: &Vec<Option<f64>>| column[lo..hi].to_vec();

        Ok(Self {
            series: sliced,
            daily_return: cut(&self.daily_return),
            cumulative_return: cut(&self.cumulative_return),
            moving_averages: self
                .moving_averages
                .iter()
                .map(|(w, column)| (*w, cut(column)))
                .collect(),
            rolling_volatility: self
                .rolling_volatility
                .iter()
                .map(|(w, column)| (*w, cut(column)))
                .collect(),
        })
    }
}
