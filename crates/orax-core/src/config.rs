//! Configuration management for orax.
//!
//! Loads configuration from ${ORAX_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Deployed contract addresses, one per oracle.
///
/// Addresses are 0x-prefixed hex as printed by the deployment tooling.
/// An empty address means "not configured" and is rejected at session
/// startup, not at load time, so unrelated commands still work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contracts {
    pub diesel_price: String,
    pub knowledge: String,
    pub chat: String,
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Node JSON-RPC endpoint.
    pub rpc_url: String,
    /// Index into the node's account list used as the transaction sender.
    pub account_index: usize,
    /// Fixed gas limit sent with every oracle transaction.
    pub gas: u64,
    /// Fixed value in wei sent with every oracle transaction (the oracle
    /// fee; the demo contracts expect 1 ether).
    pub value_wei: u64,
    /// Interval between log-filter polls.
    pub poll_interval_ms: u64,
    /// Per-request timeout for node calls.
    pub request_timeout_secs: u64,
    /// Off-chain HTTP endpoint embedded into the chat oracle's ask payload.
    pub chat_gateway_url: String,
    pub contracts: Contracts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            account_index: 1,
            gas: 3_000_000,
            value_wei: 1_000_000_000_000_000_000,
            poll_interval_ms: 1000,
            request_timeout_secs: 30,
            chat_gateway_url: "http://localhost:4000/chat".to_string(),
            contracts: Contracts::default(),
        }
    }
}

impl Config {
    /// Loads configuration from ${ORAX_HOME}/config.toml.
    ///
    /// A missing file yields defaults; a malformed file is an error.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config: {}", path.display()))
    }

    /// Interval between log-filter polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-request timeout for node calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Well-known paths under ${ORAX_HOME}.
pub mod paths {
    use std::path::PathBuf;

    /// Returns the user's home directory.
    pub fn home_dir() -> Option<PathBuf> {
        #[cfg(windows)]
        let var = std::env::var("USERPROFILE");
        #[cfg(not(windows))]
        let var = std::env::var("HOME");
        var.ok().map(PathBuf::from)
    }

    /// Returns the orax home directory (${ORAX_HOME}, default ~/.orax).
    pub fn orax_home() -> PathBuf {
        if let Ok(home) = std::env::var("ORAX_HOME") {
            return PathBuf::from(home);
        }
        home_dir()
            .map(|home| home.join(".orax"))
            .unwrap_or_else(|| PathBuf::from(".orax"))
    }

    /// Returns the config file path.
    pub fn config_path() -> PathBuf {
        orax_home().join("config.toml")
    }

    /// Returns the log directory.
    pub fn logs_dir() -> PathBuf {
        orax_home().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.account_index, 1);
        assert_eq!(config.gas, 3_000_000);
        assert_eq!(config.value_wei, 1_000_000_000_000_000_000);
        assert!(config.contracts.diesel_price.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
rpc_url = "http://node:8545"

[contracts]
diesel_price = "0x11"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(config.contracts.diesel_price, "0x11");
        // Untouched fields keep defaults.
        assert_eq!(config.poll_interval_ms, 1000);
        assert!(config.contracts.chat.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "rpc_url = [not toml").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_durations() {
        let config = Config {
            poll_interval_ms: 250,
            request_timeout_secs: 5,
            ..Config::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
