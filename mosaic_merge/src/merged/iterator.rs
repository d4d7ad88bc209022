use super::MergedResult;
use crate::result::QueryResult;
use async_trait::async_trait;
use mosaic_core::{ColumnType, MergeError, Value};

/// Concatenates the shards' rows in shard order.
pub struct IteratorMergedResult {
    sources: Vec<Box<dyn QueryResult>>,
    position: usize,
}

impl IteratorMergedResult {
    pub fn new(sources: Vec<Box<dyn QueryResult>>) -> Self {
        Self {
            sources,
            position: 0,
        }
    }
}

#[async_trait]
impl MergedResult for IteratorMergedResult {
    async fn next(&mut self) -> Result<bool, MergeError> {
        while let Some(source) = self.sources.get_mut(self.position) {
            if source.next().await? {
                return Ok(true);
            }
            self.position += 1;
        }
        Ok(false)
    }

    fn value(&self, index: usize, column_type: ColumnType) -> Result<Value, MergeError> {
        self.sources
            .get(self.position)
            .ok_or_else(|| MergeError::new("No current row"))?
            .value(index, column_type)
    }
}
