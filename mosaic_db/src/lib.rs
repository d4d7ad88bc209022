//! Backend side of the Mosaic execution core.
//!
//! Connection sources are registered per data source name. A command prepares
//! one statement per execution unit through the [`StatementPreparer`], which
//! records every connection and statement in the command's [`ResourceSet`].
//! The [`ScatterGatherExecutor`] then runs those statements on the shared
//! [`WorkerPool`] and returns the per-shard responses in submission order.

pub mod datasource;
pub mod executor;
pub mod preparer;
pub mod resource;
#[cfg(any(test, feature = "tests-cfg"))]
pub mod test_util;

pub use datasource::DataSourceRegistry;
pub use executor::core::config::{ExecutorConfig, PoolConfig, QueryConfig};
pub use executor::policy::{TransactionMode, TransactionPolicy};
pub use executor::pool::WorkerPool;
pub use executor::utils::metrics::ExecutorMetrics;
pub use executor::{ScatterGatherExecutor, ShardResponse};
pub use preparer::{PreparedUnit, StatementPreparer};
pub use resource::ResourceSet;
