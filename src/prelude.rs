pub use super::backend::cursor::{CursorState, StreamingCursor};
pub use super::backend::{BackendHandler, StatementExecuteHandler};
pub use super::config::ProxyConfig;
pub use super::context::{ProxyContext, RoutingMode};
pub use super::registry::StatementRegistry;
pub use super::telemetry::init_tracing;

pub use mosaic_core::*;
pub use mosaic_db::{ExecutorConfig, PoolConfig, QueryConfig, TransactionMode, WorkerPool};
pub use mosaic_merge::{DefaultMergeEngine, MergeEngine, MergedResult, QueryResult};
pub use strum;
