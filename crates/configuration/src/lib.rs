//! # Market Watch Configuration
//!
//! Strongly-typed settings for every layer of the system, loaded from an
//! optional TOML file and `MARKET_WATCH__*` environment variables on top of
//! built-in defaults. Also owns tracing initialisation.

use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;
pub mod universe;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{AlertThresholds, FeatureConfig, LoggingSettings, Settings, StorageSettings};
pub use telemetry::init_tracing;
pub use universe::Universe;

/// Prefix for environment overrides, e.g. `MARKET_WATCH__STORAGE__ARCHIVE_DIR`.
pub const ENV_PREFIX: &str = "MARKET_WATCH";

/// Loads the application configuration.
///
/// Sources are layered in order: built-in defaults, the TOML file at `path`
/// (skipped when it does not exist), then environment variables. The result is
/// validated before it is returned.
pub fn load_config(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(
        archive_dir = %settings.storage.archive_dir.display(),
        windows = ?settings.features.windows,
        "Configuration loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
[storage]
archive_dir = "/data/prices"

[features]
windows = [5, 10]
risk_free_rate = 0.0001

[alerts]
extreme_return = 0.2
"#,
        );
        let settings = load_config(file.path()).unwrap();
        assert_eq!(settings.storage.archive_dir, Path::new("/data/prices"));
        assert_eq!(settings.storage.file_suffix, "_stock_market_data.csv");
        assert_eq!(settings.features.windows, vec![5, 10]);
        assert_eq!(settings.features.risk_free_rate, 0.0001);
        assert_eq!(settings.features.trading_days_per_year, 252);
        assert_eq!(settings.alerts.extreme_return, 0.2);
        assert_eq!(settings.alerts.high_volatility, 0.04);
    }

    #[test]
    fn custom_universe_replaces_defaults() {
        let file = write_config(
            r#"
[universe.sectors]
Semis = ["NVDA", "AMD"]
"#,
        );
        let settings = load_config(file.path()).unwrap();
        assert_eq!(settings.universe.sector("Semis"), vec!["NVDA", "AMD"]);
        assert!(settings.universe.sector("Technology").is_empty());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let file = write_config("[features]\nwindows = [0]\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
