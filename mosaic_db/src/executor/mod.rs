pub mod core;
pub mod policy;
pub mod pool;
pub mod utils;
mod worker;

use crate::executor::core::config::QueryConfig;
use crate::executor::pool::WorkerPool;
use crate::preparer::PreparedUnit;
use mosaic_core::{CommandResponsePackets, ProxyError, RowCursor, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// What one shard answered: its packets and, for row-producing statements, the open cursor.
pub struct ShardResponse {
    pub data_source: String,
    pub packets: CommandResponsePackets,
    pub rows: Option<Box<dyn RowCursor>>,
}

impl std::fmt::Debug for ShardResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardResponse")
            .field("data_source", &self.data_source)
            .field("packets", &self.packets)
            .field("rows", &self.rows.is_some())
            .finish()
    }
}

type TaskOutput = (usize, Result<ShardResponse, ProxyError>);

/// Runs one command's prepared units in parallel and gathers their responses.
///
/// All tasks of a command live in one [`JoinSet`] and share a cancellation
/// token. The first infrastructure fault cancels the token and shuts the set
/// down, so no sibling task outlives the failed command.
#[derive(Clone, Debug)]
pub struct ScatterGatherExecutor {
    pool: WorkerPool,
    query_timeout: Option<Duration>,
}

impl ScatterGatherExecutor {
    pub fn new(pool: WorkerPool, config: &QueryConfig) -> Self {
        Self {
            pool,
            query_timeout: config.query_timeout,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Executes every unit and returns the responses in submission order.
    pub async fn execute(
        &self,
        units: Vec<PreparedUnit>,
        parameters: &[Value],
    ) -> Result<Vec<ShardResponse>, ProxyError> {
        if units.is_empty() {
            return Ok(Vec::new());
        }
        let total = units.len();
        let parameters: Arc<[Value]> = parameters.into();
        let cancel = CancellationToken::new();
        let metrics = self.pool.metrics();
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();

        for (index, unit) in units.into_iter().enumerate() {
            debug!(index, data_source = %unit.data_source, "Submitting shard task");
            let task = worker::execute_unit(
                unit,
                parameters.clone(),
                self.pool.permits(),
                cancel.clone(),
                metrics.clone(),
            );
            tasks.spawn_on(async move { (index, task.await) }, self.pool.handle());
        }

        let gathered = match self.query_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, gather(&mut tasks, total)).await {
                Ok(result) => result,
                Err(_) => Err(ProxyError::Infrastructure(format!(
                    "shard tasks did not finish within {:?}",
                    deadline
                ))),
            },
            None => gather(&mut tasks, total).await,
        };

        if let Err(e) = &gathered {
            metrics.update_fault();
            error!(error = %e, pending = tasks.len(), "Scatter-gather failed, cancelling sibling tasks");
            cancel.cancel();
            tasks.shutdown().await;
        }
        gathered
    }
}

async fn gather(
    tasks: &mut JoinSet<TaskOutput>,
    total: usize,
) -> Result<Vec<ShardResponse>, ProxyError> {
    let mut slots: Vec<Option<ShardResponse>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, response) = joined.map_err(|e| {
            let reason = if e.is_panic() { "panicked" } else { "was aborted" };
            ProxyError::Infrastructure(format!("shard task {}", reason))
        })?;
        slots[index] = Some(response?);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| ProxyError::Infrastructure(format!("shard task {} produced no response", index)))
        })
        .collect()
}
