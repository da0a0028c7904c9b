use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    #[error("No series were provided for cross-sectional analysis")]
    EmptyInput,

    #[error("Series for {tickers:?} share no common dates")]
    NoOverlap { tickers: Vec<String> },
}
