use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage location is unavailable: {path}")]
    StorageUnavailable { path: String },

    #[error("No data file found for ticker {0}")]
    TickerNotFound(String),

    #[error("Data file for ticker {0} contains no usable rows")]
    EmptySeries(String),

    #[error("I/O error while reading market data: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error while reading market data: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    /// Whether a batch load should skip the affected ticker and carry on.
    pub fn is_per_ticker(&self) -> bool {
        matches!(self, StoreError::TickerNotFound(_) | StoreError::EmptySeries(_))
    }
}
