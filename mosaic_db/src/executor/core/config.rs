use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for shard statement execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Worker pool configuration
    pub pool: PoolConfig,
    /// Per-command execution configuration
    pub query: QueryConfig,
}

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of shard tasks executing at once, across all commands
    pub max_concurrent_tasks: usize,
}

/// Per-command execution configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// How long a command waits for all of its shard tasks before failing.
    /// `None` waits until every task completes.
    pub query_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 128,
        }
    }
}

impl ExecutorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.pool.max_concurrent_tasks == 0 {
            return Err("max_concurrent_tasks must be greater than zero".into());
        }
        if self.query.query_timeout.is_some_and(|t| t.is_zero()) {
            return Err("query_timeout must be greater than zero".into());
        }
        Ok(())
    }
}
