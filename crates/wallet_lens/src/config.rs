//! Local configuration: the upstream API credential, loaded from a TOML file.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Moralis API key not found in config (expected [moralis] api_key)")]
    MissingApiKey,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MoralisConfig {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub moralis: MoralisConfig,
}

impl Config {
    /// Load and validate the config file. A missing or empty credential is a
    /// session-fatal (but recoverable) error, surfaced before any upstream call.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        if config.moralis.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.moralis.api_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_api_key() {
        let config = Config::from_toml_str("[moralis]\napi_key = \"abc123\"\n").unwrap();
        assert_eq!(config.api_key(), "abc123");
    }

    #[test]
    fn missing_section_is_missing_key() {
        let err = Config::from_toml_str("").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn empty_key_is_missing_key() {
        let err = Config::from_toml_str("[moralis]\napi_key = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "[moralis]\napi_key = \"k\"").unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.api_key(), "k");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/wallet_lens.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
