//! client configuration
//!
//! Loaded from a TOML file. Daemon credentials have no defaults and must
//! be supplied explicitly.

use crate::constants::{
    DEFAULT_HISTORY_CONCURRENCY, DEFAULT_LOCK_POLL_SECS, DEFAULT_REGISTRY_URL, DEFAULT_RPC_URL,
    DEFAULT_TIMEOUT_SECS,
};
use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_concurrency() -> usize {
    DEFAULT_HISTORY_CONCURRENCY
}

fn default_poll_secs() -> u64 {
    DEFAULT_LOCK_POLL_SECS
}

/// wallet daemon endpoint and its Basic auth credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_url")]
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RpcConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// max parallel `getrawtransaction` calls
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_HISTORY_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_LOCK_POLL_SECS,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub rpc: RpcConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl WalletConfig {
    /// defaults for everything but the daemon connection
    pub fn from_rpc(rpc: RpcConfig) -> Self {
        Self {
            rpc,
            registry: RegistryConfig::default(),
            history: HistoryConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents).map_err(|e| match e {
            WalletError::Config(msg) => WalletError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| WalletError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let check = |ok: bool, what: &str| {
            if ok {
                Ok(())
            } else {
                Err(WalletError::Config(what.to_string()))
            }
        };
        check(!self.rpc.url.trim().is_empty(), "rpc.url is empty")?;
        check(!self.rpc.username.is_empty(), "rpc.username is empty")?;
        check(!self.rpc.password.is_empty(), "rpc.password is empty")?;
        check(!self.registry.url.trim().is_empty(), "registry.url is empty")?;
        check(self.rpc.timeout_secs > 0, "rpc.timeout_secs must be positive")?;
        check(self.registry.timeout_secs > 0, "registry.timeout_secs must be positive")?;
        check(self.history.concurrency > 0, "history.concurrency must be positive")?;
        check(
            self.monitor.poll_interval_secs > 0,
            "monitor.poll_interval_secs must be positive",
        )
    }
}
