use anyhow::Context;
use mosaic_core::ProxyError;
use mosaic_db::{ExecutorConfig, TransactionMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Proxy-wide settings of the execution core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Worker pool and query deadline.
    pub executor: ExecutorConfig,
    /// Log every routed unit with its actual SQL.
    ///
    /// _Default:_ `false`.
    pub show_sql: bool,
    /// Transaction mode at startup. Can be switched at runtime through the context.
    ///
    /// _Default:_ `LOCAL`.
    pub transaction_mode: TransactionMode,
    /// Default tracing directive, overridden by `RUST_LOG`.
    ///
    /// _Default:_ `info`.
    pub log_level: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig::default(),
            show_sql: false,
            transaction_mode: TransactionMode::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ProxyConfig {
    pub fn from_json(json: &str) -> Result<Self, ProxyError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ProxyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read proxy config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid proxy config {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ProxyError> {
        self.executor.validate().map_err(ProxyError::Config)?;
        if self.log_level.trim().is_empty() {
            return Err(ProxyError::Config("log_level must not be empty".into()));
        }
        Ok(())
    }
}
