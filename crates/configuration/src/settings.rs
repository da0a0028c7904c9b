use crate::error::ConfigError;
use crate::universe::Universe;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub features: FeatureConfig,
    pub alerts: AlertThresholds,
    pub universe: Universe,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Rejects values that would make the feature or storage layers meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.file_suffix.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.file_suffix must not be empty".to_string(),
            ));
        }
        self.features.validate()?;
        self.alerts.validate()
    }
}

/// Where the per-ticker CSV files live and how they are named.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding one file per ticker.
    pub archive_dir: PathBuf,
    /// Everything after the ticker symbol in a file name,
    /// e.g. `AAPL_stock_market_data.csv`.
    pub file_suffix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            archive_dir: PathBuf::from("archive"),
            file_suffix: "_stock_market_data.csv".to_string(),
        }
    }
}

/// Conventions used by the feature engine.
///
/// A value of this struct is handed to every `FeatureEngine`, so callers with
/// different conventions can coexist in one process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Windows for the moving-average and rolling-volatility columns.
    pub windows: Vec<usize>,
    /// The headline rolling-volatility window used for volatility alerts.
    pub volatility_window: usize,
    /// Risk-free rate per trading day, subtracted from the mean daily return.
    pub risk_free_rate: f64,
    pub trading_days_per_year: usize,
}

impl FeatureConfig {
    /// Returns a copy of this configuration with a different window set.
    pub fn with_windows(&self, windows: impl IntoIterator<Item = usize>) -> Self {
        Self {
            windows: windows.into_iter().collect(),
            ..self.clone()
        }
    }

    /// Returns a copy of this configuration with a different risk-free rate.
    pub fn with_risk_free_rate(&self, risk_free_rate: f64) -> Self {
        Self {
            risk_free_rate,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.windows.contains(&0) || self.volatility_window == 0 {
            return Err(ConfigError::ValidationError(
                "feature windows must be at least 1".to_string(),
            ));
        }
        if self.trading_days_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "features.trading_days_per_year must be positive".to_string(),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "features.risk_free_rate must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            windows: vec![20, 50, 200],
            volatility_window: 30,
            risk_free_rate: 0.0,
            trading_days_per_year: 252,
        }
    }
}

/// Thresholds for flagging unusual market behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Rolling daily volatility above this is flagged (0.04 = 4%).
    pub high_volatility: f64,
    /// A single-day absolute return above this is flagged.
    pub extreme_return: f64,
    /// Pairs correlating below this are reported as diversifiers.
    pub low_correlation: f64,
}

impl AlertThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.high_volatility <= 0.0 || self.extreme_return <= 0.0 {
            return Err(ConfigError::ValidationError(
                "alert thresholds must be positive".to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.low_correlation) {
            return Err(ConfigError::ValidationError(
                "alerts.low_correlation must lie in [-1, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            high_volatility: 0.04,
            extreme_return: 0.10,
            low_correlation: 0.3,
        }
    }
}

/// Controls the tracing subscriber installed by `telemetry::init_tracing`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, e.g. `info` or `series_store=debug`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Optional log file. Console output is used when absent.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
