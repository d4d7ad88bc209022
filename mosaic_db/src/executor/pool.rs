use crate::executor::core::config::PoolConfig;
use crate::executor::utils::metrics::ExecutorMetrics;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

/// Process-wide pool that shard tasks run on.
///
/// Cloning is cheap; every clone shares the runtime handle, the concurrency
/// limit and the metrics. Commands never get exclusive use of the pool.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    handle: Handle,
    permits: Arc<Semaphore>,
    max_concurrent_tasks: usize,
    metrics: Arc<ExecutorMetrics>,
}

impl WorkerPool {
    pub fn new(handle: Handle, config: &PoolConfig) -> Self {
        Self {
            handle,
            permits: Arc::new(Semaphore::new(config.max_concurrent_tasks)),
            max_concurrent_tasks: config.max_concurrent_tasks,
            metrics: Arc::new(ExecutorMetrics::new()),
        }
    }

    /// Pool on the runtime of the calling task.
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current(config: &PoolConfig) -> Self {
        Self::new(Handle::current(), config)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn permits(&self) -> Arc<Semaphore> {
        self.permits.clone()
    }

    pub fn metrics(&self) -> Arc<ExecutorMetrics> {
        self.metrics.clone()
    }

    pub fn max_concurrent_tasks(&self) -> usize {
        self.max_concurrent_tasks
    }

    /// Number of tasks currently holding an execution slot.
    pub fn busy(&self) -> usize {
        self.max_concurrent_tasks - self.permits.available_permits()
    }

    /// Stops admitting tasks. Tasks submitted afterwards fail as rejected.
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}
