use super::MergedResult;
use crate::result::QueryResult;
use async_trait::async_trait;
use futures::future::try_join_all;
use mosaic_core::{ColumnType, MergeError, OrderDirection, OrderItem, Value};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tracing::trace;

/// Sort key of a shard's current row.
struct HeapEntry {
    key: Vec<Value>,
    source: usize,
    directions: Arc<[OrderDirection]>,
}

impl HeapEntry {
    fn compare_keys(&self, other: &Self) -> Ordering {
        for ((a, b), direction) in self.key.iter().zip(&other.key).zip(self.directions.iter()) {
            let ordering = match direction {
                OrderDirection::Asc => a.compare(b),
                OrderDirection::Desc => b.compare(a),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        // ties go to the earlier shard
        self.source.cmp(&other.source)
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.compare_keys(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap
        other.compare_keys(self)
    }
}

/// Streaming k-way merge of shards that are each already sorted on the ORDER BY items.
///
/// Only one row per shard is buffered: the sort key of the shard's current row.
pub struct OrderByStreamMergedResult {
    sources: Vec<Box<dyn QueryResult>>,
    order_by: Vec<(usize, ColumnType)>,
    directions: Arc<[OrderDirection]>,
    heap: BinaryHeap<HeapEntry>,
    current: Option<usize>,
}

impl OrderByStreamMergedResult {
    /// Positions every shard on its first row and seeds the merge heap.
    pub async fn new(
        mut sources: Vec<Box<dyn QueryResult>>,
        order_by: &[OrderItem],
    ) -> Result<Self, MergeError> {
        let order_columns = match sources.first() {
            Some(first) => order_by
                .iter()
                .map(|item| Ok((item.index, first.column_type(item.index)?)))
                .collect::<Result<Vec<_>, MergeError>>()?,
            None => Vec::new(),
        };
        let primed = try_join_all(sources.iter_mut().map(|source| source.next())).await?;

        let mut merged = Self {
            sources,
            order_by: order_columns,
            directions: order_by.iter().map(|item| item.direction).collect(),
            heap: BinaryHeap::new(),
            current: None,
        };
        for (source, has_row) in primed.into_iter().enumerate() {
            if has_row {
                merged.push(source)?;
            }
        }
        trace!(shards = merged.sources.len(), primed = merged.heap.len(), "Order-by merge primed");
        Ok(merged)
    }

    fn push(&mut self, source: usize) -> Result<(), MergeError> {
        let key = self
            .order_by
            .iter()
            .map(|(index, column_type)| self.sources[source].value(*index, *column_type))
            .collect::<Result<Vec<_>, _>>()?;
        self.heap.push(HeapEntry {
            key,
            source,
            directions: self.directions.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl MergedResult for OrderByStreamMergedResult {
    async fn next(&mut self) -> Result<bool, MergeError> {
        if let Some(source) = self.current.take() {
            if self.sources[source].next().await? {
                self.push(source)?;
            }
        }
        match self.heap.pop() {
            Some(entry) => {
                self.current = Some(entry.source);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn value(&self, index: usize, column_type: ColumnType) -> Result<Value, MergeError> {
        let source = self.current.ok_or_else(|| MergeError::new("No current row"))?;
        self.sources[source].value(index, column_type)
    }
}
