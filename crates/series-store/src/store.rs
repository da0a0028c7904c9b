use crate::discovery::{discover_tickers, is_valid_ticker, ticker_path, unavailable};
use crate::error::StoreError;
use crate::parser::{ParseStats, parse_records};
use configuration::StorageSettings;
use core_types::{TimeSeries, canonicalize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// A parsed series together with the row counts of the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries {
    pub series: TimeSeries,
    pub stats: ParseStats,
}

/// A ticker left out of a batch load, and why.
#[derive(Debug)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: StoreError,
}

/// The outcome of loading several tickers at once. Partial success is normal.
#[derive(Debug, Default)]
pub struct BatchLoad {
    pub series: BTreeMap<String, TimeSeries>,
    pub skipped: Vec<SkippedTicker>,
}

impl BatchLoad {
    pub fn skipped_tickers(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.ticker.as_str()).collect()
    }
}

/// Read-only access to the archive of per-ticker CSV files.
///
/// Parsed series are memoised per ticker. `reload`, `invalidate` and `refresh`
/// are the ways to drop a memoised copy.
#[derive(Debug)]
pub struct SeriesStore {
    root: PathBuf,
    file_suffix: String,
    tickers: Vec<String>,
    cache: HashMap<String, LoadedSeries>,
}

impl SeriesStore {
    /// Opens the archive described by `settings` and discovers its tickers.
    pub fn open(settings: &StorageSettings) -> Result<Self, StoreError> {
        Self::with_root(&settings.archive_dir, &settings.file_suffix)
    }

    pub fn with_root(root: impl AsRef<Path>, file_suffix: &str) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        let tickers = discover_tickers(&root, file_suffix)?;
        Ok(Self {
            root,
            file_suffix: file_suffix.to_string(),
            tickers,
            cache: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tickers found at the last discovery, sorted ascending.
    pub fn list_tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers
            .binary_search_by(|t| t.as_str().cmp(ticker))
            .is_ok()
    }

    /// Re-scans the archive and drops every memoised series, so files that
    /// changed on disk are read again on the next load.
    pub fn refresh(&mut self) -> Result<&[String], StoreError> {
        self.tickers = discover_tickers(&self.root, &self.file_suffix)?;
        self.cache.clear();
        Ok(&self.tickers)
    }

    /// Loads one ticker's series, serving the memoised copy when present.
    pub fn load(&mut self, ticker: &str) -> Result<TimeSeries, StoreError> {
        self.load_detailed(ticker).map(|loaded| loaded.series)
    }

    /// Like [`SeriesStore::load`], also returning the file's row counts.
    pub fn load_detailed(&mut self, ticker: &str) -> Result<LoadedSeries, StoreError> {
        if let Some(cached) = self.cache.get(ticker) {
            tracing::debug!("Serving {} from cache", ticker);
            return Ok(cached.clone());
        }
        let loaded = self.read_from_disk(ticker)?;
        self.cache.insert(ticker.to_string(), loaded.clone());
        Ok(loaded)
    }

    /// Drops any memoised copy and reads the file again.
    pub fn reload(&mut self, ticker: &str) -> Result<TimeSeries, StoreError> {
        self.invalidate(ticker);
        self.load(ticker)
    }

    /// Drops the memoised copy of `ticker`. Returns whether one existed.
    pub fn invalidate(&mut self, ticker: &str) -> bool {
        self.cache.remove(ticker).is_some()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_tickers(&self) -> usize {
        self.cache.len()
    }

    /// Loads several tickers. Tickers that are missing or have no usable rows
    /// are skipped and reported; any other failure aborts the batch.
    pub fn load_many<I, S>(&mut self, tickers: I) -> Result<BatchLoad, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: BTreeSet<String> = tickers
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect();

        let mut batch = BatchLoad::default();
        for ticker in requested {
            match self.load(&ticker) {
                Ok(series) => {
                    batch.series.insert(ticker, series);
                }
                Err(reason) if reason.is_per_ticker() => {
                    tracing::warn!("Skipping {}: {}", ticker, reason);
                    batch.skipped.push(SkippedTicker { ticker, reason });
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Loaded {} series ({} skipped)",
            batch.series.len(),
            batch.skipped.len()
        );
        Ok(batch)
    }

    /// Loads every discovered ticker.
    pub fn load_all(&mut self) -> Result<BatchLoad, StoreError> {
        let tickers = self.tickers.clone();
        self.load_many(tickers)
    }

    fn read_from_disk(&self, ticker: &str) -> Result<LoadedSeries, StoreError> {
        if !is_valid_ticker(ticker) {
            return Err(StoreError::TickerNotFound(ticker.to_string()));
        }
        if !self.root.is_dir() {
            return Err(unavailable(&self.root));
        }

        let path = ticker_path(&self.root, ticker, &self.file_suffix);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::TickerNotFound(ticker.to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        if !path.is_file() {
            return Err(StoreError::TickerNotFound(ticker.to_string()));
        }

        let (records, mut stats) = parse_records(BufReader::new(file))?;
        let (records, duplicates) = canonicalize(records);
        stats.duplicates_resolved = duplicates;

        if records.is_empty() {
            return Err(StoreError::EmptySeries(ticker.to_string()));
        }
        if stats.rows_dropped > 0 {
            tracing::warn!(
                "Dropped {} of {} rows for {}",
                stats.rows_dropped,
                stats.rows_read,
                ticker
            );
        }
        if duplicates > 0 {
            tracing::warn!("Resolved {} duplicate dates for {}", duplicates, ticker);
        }

        let series = TimeSeries::new(ticker, records);
        tracing::info!(
            "Loaded {} records for {} ({:?} to {:?})",
            series.len(),
            ticker,
            series.first_date(),
            series.last_date()
        );
        Ok(LoadedSeries { series, stats })
    }
}
