//! Settings file
//!
//! One JSON document loaded at startup: the clients (terminal connections),
//! the strategies to run and the timing knobs of the pipeline.

use luatrader_order_manager::{AmountLimits, ExecutionConfig};
use luatrader_ports::AdvisorConfig;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CLIENT_QUIK: &str = "quik";
pub const CLIENT_MOCK: &str = "mock";

/// Upper bound of every `*_secs` timing value (one year)
pub const MAX_TIMING_SECS: u64 = 365 * 24 * 3600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    luatrader_gateway::DEFAULT_PORT
}

/// One terminal connection and the money limits of its account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub key: String,
    /// `quik` or `mock`
    #[serde(rename = "type")]
    pub kind: String,
    pub firm: String,
    pub portfolio: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub max_amount: Decimal,
    #[serde(default)]
    pub weight: Decimal,
}

impl ClientConfig {
    pub fn limits(&self) -> AmountLimits {
        AmountLimits {
            amount: self.amount,
            max_amount: self.max_amount,
            weight: self.weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub advice_max_age_secs: u64,
    pub signal_lookback_secs: u64,
    pub reconcile_delay_secs: u64,
    /// Periodic position check; off when absent
    pub reconcile_interval_secs: Option<u64>,
    pub slippage: f64,
    pub last_candles_count: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            advice_max_age_secs: 540,
            signal_lookback_secs: 600,
            reconcile_delay_secs: 30,
            reconcile_interval_secs: None,
            slippage: 0.001,
            last_candles_count: 5000,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("advice_max_age_secs", Some(self.advice_max_age_secs)),
            ("signal_lookback_secs", Some(self.signal_lookback_secs)),
            ("reconcile_delay_secs", Some(self.reconcile_delay_secs)),
            ("reconcile_interval_secs", self.reconcile_interval_secs),
        ];
        for (name, secs) in durations {
            if secs.is_some_and(|secs| secs > MAX_TIMING_SECS) {
                return Err(ConfigError::Invalid(format!(
                    "timing.{} exceeds {} seconds",
                    name, MAX_TIMING_SECS
                )));
            }
        }
        if !(0.0..1.0).contains(&self.slippage) {
            return Err(ConfigError::Invalid(format!(
                "timing.slippage {} is outside [0, 1)",
                self.slippage
            )));
        }
        if self.last_candles_count == 0 {
            return Err(ConfigError::Invalid("timing.last_candles_count is zero".into()));
        }
        Ok(())
    }

    pub fn execution(&self) -> ExecutionConfig {
        let defaults = ExecutionConfig::default();
        ExecutionConfig {
            advice_max_age: chrono::Duration::seconds(self.advice_max_age_secs as i64),
            slippage: Decimal::from_f64(self.slippage).unwrap_or(defaults.slippage),
        }
    }

    pub fn signal_lookback(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.signal_lookback_secs as i64)
    }

    pub fn reconcile_delay(&self) -> Duration {
        Duration::from_secs(self.reconcile_delay_secs)
    }

    pub fn reconcile_interval(&self) -> Option<Duration> {
        self.reconcile_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub clients: Vec<ClientConfig>,
    pub strategies: Vec<AdvisorConfig>,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clients.is_empty() {
            return Err(ConfigError::Invalid("no clients".into()));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::Invalid("no strategies".into()));
        }
        self.timing.validate()?;
        let mut keys = HashSet::new();
        for client in &self.clients {
            if !keys.insert(client.key.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate client key {}",
                    client.key
                )));
            }
            if client.kind != CLIENT_QUIK && client.kind != CLIENT_MOCK {
                return Err(ConfigError::Invalid(format!(
                    "unknown client type {} for {}",
                    client.kind, client.key
                )));
            }
        }
        Ok(())
    }

    /// The client to run: the named one, or the only one configured
    pub fn client(&self, key: Option<&str>) -> Result<&ClientConfig, ConfigError> {
        match key {
            Some(key) => self
                .clients
                .iter()
                .find(|c| c.key == key)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown client {}", key))),
            None => match self.clients.as_slice() {
                [client] => Ok(client),
                _ => Err(ConfigError::Invalid(
                    "several clients configured, choose one with --client".into(),
                )),
            },
        }
    }
}
