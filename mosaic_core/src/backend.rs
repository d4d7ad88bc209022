//! Backend seams: where connections, prepared statements and row cursors come from.

use crate::error::BackendError;
use crate::types::{ColumnDefinition, Value};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrepareOptions {
    pub return_generated_keys: bool,
}

/// Hands out connections to one physical data source.
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    async fn connection(&self) -> Result<Arc<dyn BackendConnection>, BackendError>;
}

#[async_trait]
pub trait BackendConnection: Send + Sync {
    async fn prepare(
        &self,
        sql: &str,
        options: PrepareOptions,
    ) -> Result<Arc<dyn BackendStatement>, BackendError>;

    /// Returns the connection to its source. Must tolerate repeated calls.
    fn close(&self);
}

#[async_trait]
pub trait BackendStatement: Send + Sync {
    async fn execute(&self, parameters: &[Value]) -> Result<StatementOutcome, BackendError>;

    /// Closes the statement and any cursor it produced. Must tolerate repeated calls.
    fn close(&self);
}

/// Forward-only cursor over the rows a backend statement produced.
#[async_trait]
pub trait RowCursor: Send {
    /// Moves to the next row; `false` once the rows are exhausted.
    async fn next(&mut self) -> Result<bool, BackendError>;

    /// Value at 1-based `index` of the current row.
    fn value(&self, index: usize) -> Result<Value, BackendError>;
}

pub enum StatementOutcome {
    Update {
        affected_rows: u64,
        last_insert_id: u64,
    },
    Rows {
        columns: Vec<ColumnDefinition>,
        cursor: Box<dyn RowCursor>,
    },
}

impl std::fmt::Debug for StatementOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementOutcome::Update {
                affected_rows,
                last_insert_id,
            } => f
                .debug_struct("Update")
                .field("affected_rows", affected_rows)
                .field("last_insert_id", last_insert_id)
                .finish(),
            StatementOutcome::Rows { columns, .. } => {
                f.debug_struct("Rows").field("columns", columns).finish_non_exhaustive()
            }
        }
    }
}
