use crate::merged::{
    IteratorMergedResult, LimitDecoratorMergedResult, MergedResult, OrderByStreamMergedResult,
};
use crate::result::QueryResult;
use async_trait::async_trait;
use mosaic_core::{MergeError, SqlStatement};
use tracing::debug;

/// Combines the row streams of every shard into one.
#[async_trait]
pub trait MergeEngine: Send + Sync {
    async fn merge(
        &self,
        results: Vec<Box<dyn QueryResult>>,
        statement: &SqlStatement,
    ) -> Result<Box<dyn MergedResult>, MergeError>;
}

/// Plain concatenation, or a streaming sort merge when the statement is ordered.
/// LIMIT/OFFSET is applied on top of either.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMergeEngine;

impl DefaultMergeEngine {
    pub fn new() -> Self {
        Self
    }

    fn validate(results: &[Box<dyn QueryResult>], statement: &SqlStatement) -> Result<(), MergeError> {
        let Some(first) = results.first() else {
            return Ok(());
        };
        let column_count = first.column_count();
        if let Some((shard, other)) = results
            .iter()
            .enumerate()
            .find(|(_, r)| r.column_count() != column_count)
        {
            return Err(MergeError::new(format!(
                "Shard {} returned {} columns, expected {}",
                shard,
                other.column_count(),
                column_count
            )));
        }
        if let Some(item) = statement
            .order_by
            .iter()
            .find(|item| item.index == 0 || item.index > column_count)
        {
            return Err(MergeError::new(format!(
                "Order by column index {} out of range for {} columns",
                item.index, column_count
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MergeEngine for DefaultMergeEngine {
    async fn merge(
        &self,
        results: Vec<Box<dyn QueryResult>>,
        statement: &SqlStatement,
    ) -> Result<Box<dyn MergedResult>, MergeError> {
        Self::validate(&results, statement)?;
        debug!(
            shards = results.len(),
            ordered = !statement.order_by.is_empty(),
            paginated = statement.pagination.is_some(),
            "Merging shard results"
        );

        let merged: Box<dyn MergedResult> = if statement.order_by.is_empty() {
            Box::new(IteratorMergedResult::new(results))
        } else {
            Box::new(OrderByStreamMergedResult::new(results, &statement.order_by).await?)
        };
        Ok(match statement.pagination {
            Some(pagination) => Box::new(LimitDecoratorMergedResult::new(merged, pagination)),
            None => merged,
        })
    }
}
