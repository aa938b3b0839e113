//! Harness configuration using Figment.
//!
//! Configuration is loaded from a TOML file merged with environment variables
//! prefixed `CONFOPS_HARNESS_`. Every field has a default, so a missing file
//! yields a usable configuration.
//!
//! # Example
//! ```no_run
//! use confops_harness::config::HarnessConfig;
//!
//! # fn main() -> Result<(), figment::Error> {
//! let config = HarnessConfig::load_from("config/harness.toml")?;
//! println!("log level: {}", config.application.log_level);
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Application settings.
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Suite run settings.
    #[serde(default)]
    pub run: RunConfig,
    /// In-memory session behavior for self-test runs.
    #[serde(default)]
    pub mock: MockConfig,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Suite run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Path to the fixture JSON file.
    #[serde(default = "default_fixtures")]
    pub fixtures: PathBuf,
    /// Use the concurrent fan-out delete phase instead of the sequential one.
    #[serde(default)]
    pub concurrent_delete: bool,
}

/// In-memory session configuration for self-test runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockConfig {
    /// Uniform per-call delay in milliseconds.
    #[serde(default)]
    pub communication_delay_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fixtures() -> PathBuf {
    PathBuf::from("testdata/fixtures.json")
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fixtures: default_fixtures(),
            concurrent_delete: false,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a specific file path merged with
    /// `CONFOPS_HARNESS_`-prefixed environment variables.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(HarnessConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CONFOPS_HARNESS_").split("__"))
            .extract()
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.run.fixtures.as_os_str().is_empty() {
            return Err("run.fixtures must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = HarnessConfig::load_from("does/not/exist.toml").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.run.fixtures, PathBuf::from("testdata/fixtures.json"));
        assert!(!config.run.concurrent_delete);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
            [application]
            log_level = "debug"

            [run]
            fixtures = "other/fixtures.json"
            concurrent_delete = true

            [mock]
            communication_delay_ms = 5
            "#,
        )
        .unwrap();

        let config = HarnessConfig::load_from(file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert!(config.run.concurrent_delete);
        assert_eq!(config.mock.communication_delay_ms, 5);
    }

    #[test]
    fn test_validate_rejects_bad_log_level() {
        let mut config = HarnessConfig::default();
        config.application.log_level = "verbose".into();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid log_level"));
    }
}
