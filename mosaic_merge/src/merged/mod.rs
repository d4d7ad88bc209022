mod iterator;
mod limit;
mod order_by;

pub use iterator::IteratorMergedResult;
pub use limit::LimitDecoratorMergedResult;
pub use order_by::OrderByStreamMergedResult;

use async_trait::async_trait;
use mosaic_core::{ColumnType, MergeError, Value};

/// The single row stream produced by merging every shard of a command.
#[async_trait]
pub trait MergedResult: Send {
    async fn next(&mut self) -> Result<bool, MergeError>;

    /// Reads the 1-based column `index` of the current row as `column_type`.
    fn value(&self, index: usize, column_type: ColumnType) -> Result<Value, MergeError>;
}
