use crate::error::StoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core_types::TimeSeriesRecord;
use serde::Deserialize;
use std::io::Read;

/// Row counts gathered while parsing one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Data rows in the file, excluding the header.
    pub rows_read: usize,
    /// Rows discarded for an unparsable date, bad prices or a bad volume.
    pub rows_dropped: usize,
    /// Rows superseded by a later row with the same date.
    pub duplicates_resolved: usize,
}

/// One CSV row as written by the market-data export. Columns are matched by
/// header name, so their order in the file does not matter.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
    #[serde(rename = "Stock Splits", default)]
    split_factor: Option<f64>,
}

impl RawRow {
    fn into_record(self) -> Option<TimeSeriesRecord> {
        let date = parse_date(&self.date)?;
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return None;
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return None;
        }
        Some(TimeSeriesRecord {
            date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume.round() as u64,
            split_factor: self.split_factor.unwrap_or(0.0),
        })
    }
}

/// Parses every usable row of a CSV source, in file order.
///
/// Malformed rows are counted in `rows_dropped` rather than failing the whole
/// read. Only I/O failures of the underlying reader are returned as errors.
pub fn parse_records<R: Read>(
    source: R,
) -> Result<(Vec<TimeSeriesRecord>, ParseStats), StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut records = Vec::new();
    let mut stats = ParseStats::default();

    for (row_num, result) in reader.deserialize::<RawRow>().enumerate() {
        stats.rows_read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(StoreError::Csv(e)),
            Err(e) => {
                tracing::debug!("Skipping row {}: {}", row_num + 1, e);
                stats.rows_dropped += 1;
                continue;
            }
        };
        match row.into_record() {
            Some(record) => records.push(record),
            None => {
                tracing::debug!("Skipping row {}: unusable date, price or volume", row_num + 1);
                stats.rows_dropped += 1;
            }
        }
    }

    Ok((records, stats))
}

/// Parses the calendar date out of the formats seen in market-data exports.
/// Any time-of-day or UTC offset is discarded; the date as written is kept.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.naive_local().date());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}
