use super::MergedResult;
use async_trait::async_trait;
use mosaic_core::{ColumnType, MergeError, Pagination, Value};

/// Applies the logical LIMIT/OFFSET on top of an already merged stream.
pub struct LimitDecoratorMergedResult {
    inner: Box<dyn MergedResult>,
    pagination: Pagination,
    skipped: bool,
    returned: u64,
}

impl LimitDecoratorMergedResult {
    pub fn new(inner: Box<dyn MergedResult>, pagination: Pagination) -> Self {
        Self {
            inner,
            pagination,
            skipped: false,
            returned: 0,
        }
    }
}

#[async_trait]
impl MergedResult for LimitDecoratorMergedResult {
    async fn next(&mut self) -> Result<bool, MergeError> {
        if !self.skipped {
            self.skipped = true;
            for _ in 0..self.pagination.offset {
                if !self.inner.next().await? {
                    return Ok(false);
                }
            }
        }
        if self
            .pagination
            .row_count
            .is_some_and(|limit| self.returned >= limit)
        {
            return Ok(false);
        }
        let more = self.inner.next().await?;
        if more {
            self.returned += 1;
        }
        Ok(more)
    }

    fn value(&self, index: usize, column_type: ColumnType) -> Result<Value, MergeError> {
        self.inner.value(index, column_type)
    }
}
