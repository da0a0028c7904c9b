use crate::error::StoreError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Scans `root` for files named `<TICKER><suffix>` and returns the tickers,
/// sorted ascending and de-duplicated.
pub fn discover_tickers(root: &Path, suffix: &str) -> Result<Vec<String>, StoreError> {
    if !root.is_dir() {
        return Err(unavailable(root));
    }
    let entries = std::fs::read_dir(root).map_err(|_| unavailable(root))?;

    let mut tickers = BTreeSet::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(ticker) = ticker_from_file_name(name, suffix) {
            tickers.insert(ticker.to_string());
        }
    }

    tracing::info!("Discovered {} tickers in {}", tickers.len(), root.display());
    Ok(tickers.into_iter().collect())
}

/// Extracts the ticker from a file name following the naming convention.
pub fn ticker_from_file_name<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    name.strip_suffix(suffix).filter(|ticker| is_valid_ticker(ticker))
}

/// The file a ticker's data is expected in.
pub fn ticker_path(root: &Path, ticker: &str, suffix: &str) -> PathBuf {
    root.join(format!("{ticker}{suffix}"))
}

/// Rejects empty symbols and anything that could escape the archive directory.
pub fn is_valid_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker != "."
        && ticker != ".."
        && !ticker.contains(['/', '\\'])
}

pub(crate) fn unavailable(root: &Path) -> StoreError {
    StoreError::StorageUnavailable {
        path: root.display().to_string(),
    }
}
