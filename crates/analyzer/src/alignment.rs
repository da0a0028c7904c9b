use crate::error::AnalyzerError;
use chrono::NaiveDate;
use core_types::PriceField;
use features::AnnotatedSeries;
use serde::Serialize;
use std::collections::BTreeMap;

/// Several tickers' values laid side by side on a shared date calendar.
///
/// The calendar is the inner join of the input series: a date is present only
/// if every series has a record for it. Positions are never matched by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedTable {
    pub field: PriceField,
    pub tickers: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// One column per ticker, in `tickers` order, one entry per date.
    pub columns: Vec<Vec<Option<f64>>>,
}

impl AlignedTable {
    pub fn column(&self, ticker: &str) -> Option<&[Option<f64>]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Dates present in every series, ascending.
pub fn common_dates(series_by_ticker: &BTreeMap<String, AnnotatedSeries>) -> Vec<NaiveDate> {
    let Some(shortest) = series_by_ticker.values().min_by_key(|s| s.len()) else {
        return Vec::new();
    };
    shortest
        .dates()
        .into_iter()
        .filter(|date| {
            series_by_ticker
                .values()
                .all(|s| s.series().position(*date).is_some())
        })
        .collect()
}

/// Aligns `field` of every series on the inner-joined calendar.
///
/// Tickers appear in ascending order, following the map's keys.
pub fn align(
    series_by_ticker: &BTreeMap<String, AnnotatedSeries>,
    field: PriceField,
) -> Result<AlignedTable, AnalyzerError> {
    if series_by_ticker.is_empty() {
        return Err(AnalyzerError::EmptyInput);
    }
    let dates = common_dates(series_by_ticker);
    if dates.is_empty() {
        return Err(AnalyzerError::NoOverlap {
            tickers: series_by_ticker.keys().cloned().collect(),
        });
    }

    let columns = series_by_ticker
        .values()
        .map(|s| {
            dates
                .iter()
                .map(|date| {
                    let i = s.series().position(*date)?;
                    match field {
                        PriceField::Close => Some(s.records()[i].close),
                        PriceField::DailyReturn => s.daily_return()[i],
                    }
                })
                .collect()
        })
        .collect();

    tracing::debug!(
        "Aligned {} tickers on {} common dates ({})",
        series_by_ticker.len(),
        dates.len(),
        field.label()
    );

    Ok(AlignedTable {
        field,
        tickers: series_by_ticker.keys().cloned().collect(),
        dates,
        columns,
    })
}
