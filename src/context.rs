use crate::config::ProxyConfig;
use crate::registry::StatementRegistry;
use mosaic_core::{ConnectionSource, MasterSlaveRouter, ProxyError, ShardingRouter, StatementJudge};
use mosaic_db::{
    DataSourceRegistry, ScatterGatherExecutor, StatementPreparer, TransactionMode,
    TransactionPolicy, WorkerPool,
};
use mosaic_merge::{DefaultMergeEngine, MergeEngine};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

/// How the proxy decides where a statement runs.
#[derive(Clone)]
pub enum RoutingMode {
    Sharding(Arc<dyn ShardingRouter>),
    /// Read/write splitting only: every statement runs on exactly one data source.
    MasterSlave {
        router: Arc<dyn MasterSlaveRouter>,
        judge: Arc<dyn StatementJudge>,
    },
}

impl std::fmt::Debug for RoutingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingMode::Sharding(_) => f.write_str("Sharding"),
            RoutingMode::MasterSlave { .. } => f.write_str("MasterSlave"),
        }
    }
}

/// Everything a command handler needs, shared by all commands of the proxy.
pub struct ProxyContext {
    config: ProxyConfig,
    data_sources: Arc<DataSourceRegistry>,
    statements: StatementRegistry,
    routing: RoutingMode,
    policy: TransactionPolicy,
    preparer: StatementPreparer,
    executor: ScatterGatherExecutor,
    merge_engine: Arc<dyn MergeEngine>,
}

impl ProxyContext {
    pub fn builder(config: ProxyConfig) -> ProxyContextBuilder {
        ProxyContextBuilder::new(config)
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn data_sources(&self) -> &DataSourceRegistry {
        &self.data_sources
    }

    pub fn statements(&self) -> &StatementRegistry {
        &self.statements
    }

    pub fn routing(&self) -> &RoutingMode {
        &self.routing
    }

    pub fn policy(&self) -> &TransactionPolicy {
        &self.policy
    }

    pub fn transaction_mode(&self) -> TransactionMode {
        self.policy.mode()
    }

    pub fn set_transaction_mode(&self, mode: TransactionMode) {
        info!(?mode, "Switching transaction mode");
        self.policy.set_mode(mode);
    }

    pub fn preparer(&self) -> &StatementPreparer {
        &self.preparer
    }

    pub fn executor(&self) -> &ScatterGatherExecutor {
        &self.executor
    }

    pub fn merge_engine(&self) -> &dyn MergeEngine {
        self.merge_engine.as_ref()
    }

    pub fn show_sql(&self) -> bool {
        self.config.show_sql
    }
}

impl std::fmt::Debug for ProxyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyContext")
            .field("data_sources", &self.data_sources)
            .field("routing", &self.routing)
            .field("transaction_mode", &self.transaction_mode())
            .field("show_sql", &self.config.show_sql)
            .finish_non_exhaustive()
    }
}

pub struct ProxyContextBuilder {
    config: ProxyConfig,
    data_sources: DataSourceRegistry,
    routing: Option<RoutingMode>,
    merge_engine: Option<Arc<dyn MergeEngine>>,
    pool: Option<WorkerPool>,
}

impl ProxyContextBuilder {
    fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            data_sources: DataSourceRegistry::new(),
            routing: None,
            merge_engine: None,
            pool: None,
        }
    }

    pub fn data_source(self, name: impl Into<String>, source: Arc<dyn ConnectionSource>) -> Self {
        self.data_sources.register(name, source);
        self
    }

    pub fn sharding(mut self, router: Arc<dyn ShardingRouter>) -> Self {
        self.routing = Some(RoutingMode::Sharding(router));
        self
    }

    pub fn master_slave(
        mut self,
        router: Arc<dyn MasterSlaveRouter>,
        judge: Arc<dyn StatementJudge>,
    ) -> Self {
        self.routing = Some(RoutingMode::MasterSlave { router, judge });
        self
    }

    pub fn merge_engine(mut self, engine: Arc<dyn MergeEngine>) -> Self {
        self.merge_engine = Some(engine);
        self
    }

    /// Shares an existing pool instead of creating one on the current runtime.
    pub fn pool(mut self, pool: WorkerPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn build(self) -> Result<Arc<ProxyContext>, ProxyError> {
        self.config.validate()?;
        let routing = self
            .routing
            .ok_or_else(|| ProxyError::Config("no routing configured".into()))?;
        let pool = match self.pool {
            Some(pool) => pool,
            None => {
                let handle = Handle::try_current()
                    .map_err(|e| ProxyError::Config(format!("no runtime for the worker pool: {}", e)))?;
                WorkerPool::new(handle, &self.config.executor.pool)
            }
        };
        let data_sources = Arc::new(self.data_sources);
        info!(
            data_sources = data_sources.len(),
            routing = ?routing,
            max_concurrent_tasks = pool.max_concurrent_tasks(),
            "Proxy context ready"
        );

        Ok(Arc::new(ProxyContext {
            policy: TransactionPolicy::new(self.config.transaction_mode),
            preparer: StatementPreparer::new(data_sources.clone()),
            executor: ScatterGatherExecutor::new(pool, &self.config.executor.query),
            merge_engine: self
                .merge_engine
                .unwrap_or_else(|| Arc::new(DefaultMergeEngine::new())),
            statements: StatementRegistry::new(),
            data_sources,
            routing,
            config: self.config,
        }))
    }
}
