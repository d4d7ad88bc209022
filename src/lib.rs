//! mosaic - execution core of a sharding database proxy
//!
//! A prepared statement is routed to its shards, executed on all of them in
//! parallel, and the shard responses are merged into the one response the
//! client sees. Rows of a merged query are then pulled one packet at a time
//! through the handler's cursor.

pub mod backend;
pub mod config;
pub mod context;
pub mod prelude;
pub mod registry;
pub mod telemetry;

pub use backend::cursor::{CursorState, StreamingCursor};
pub use backend::{BackendHandler, StatementExecuteHandler};
pub use config::ProxyConfig;
pub use context::{ProxyContext, ProxyContextBuilder, RoutingMode};
pub use registry::StatementRegistry;
