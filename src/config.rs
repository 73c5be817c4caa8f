//! Run settings: built-in defaults, then `salarios.toml`, then `SALARIOS_*` env vars.

use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://salariosperu.com";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const SETTINGS_FILE: &str = "salarios";
const ENV_PREFIX: &str = "SALARIOS";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub db_path: PathBuf,
    pub csv_path: PathBuf,
    /// Written by `discover`, read by `run --catalog`.
    pub catalog_path: PathBuf,
    pub format_repair: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(SETTINGS_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        Self::from_builder(builder)
    }

    /// Layer the built-in defaults under `builder`, deserialize and validate.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("delay_ms", 2000_i64)?
            .set_default("timeout_secs", 10_i64)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("db_path", "data/salarios.sqlite")?
            .set_default("csv_path", "data/salarios.csv")?
            .set_default("catalog_path", "data/empresas.json")?
            .set_default("format_repair", true)?
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs",
                reason: "must be positive".into(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "user_agent",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: reason.to_string(),
        };
        let url = Url::parse(&self.base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path"));
        }
        Ok(url)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_sources() {
        let s = Settings::from_builder(Config::builder()).unwrap();
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.delay(), Duration::from_secs(2));
        assert_eq!(s.timeout(), Duration::from_secs(10));
        assert!(s.format_repair);
        assert_eq!(s.db_path, PathBuf::from("data/salarios.sqlite"));
        assert_eq!(s.catalog_path, PathBuf::from("data/empresas.json"));
    }

    #[test]
    fn overrides_win_over_defaults() {
        let builder = Config::builder()
            .set_override("delay_ms", 250_i64)
            .unwrap()
            .set_override("format_repair", false)
            .unwrap();
        let s = Settings::from_builder(builder).unwrap();
        assert_eq!(s.delay_ms, 250);
        assert!(!s.format_repair);
    }

    #[test]
    fn rejects_bad_base_url() {
        let builder = Config::builder()
            .set_override("base_url", "not a url")
            .unwrap();
        let err = Settings::from_builder(builder).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let builder = Config::builder()
            .set_override("base_url", "ftp://salariosperu.com")
            .unwrap();
        assert!(Settings::from_builder(builder).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let builder = Config::builder()
            .set_override("timeout_secs", 0_i64)
            .unwrap();
        let err = Settings::from_builder(builder).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "timeout_secs", .. }));
    }
}
