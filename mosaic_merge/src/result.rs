use async_trait::async_trait;
use mosaic_core::{ColumnDefinition, ColumnType, CommandResponsePackets, MergeError, RowCursor, Value};

/// Rows of one shard as seen by the merge engine.
#[async_trait]
pub trait QueryResult: Send {
    /// Moves to the next row. Returns `false` once the shard has no more rows.
    async fn next(&mut self) -> Result<bool, MergeError>;

    /// Reads the 1-based column `index` of the current row as `column_type`.
    fn value(&self, index: usize, column_type: ColumnType) -> Result<Value, MergeError>;

    fn column_count(&self) -> usize;

    fn column_label(&self, index: usize) -> Result<&str, MergeError>;

    fn column_type(&self, index: usize) -> Result<ColumnType, MergeError>;
}

/// [`QueryResult`] over a shard's column definitions and its open backend cursor.
pub struct ShardQueryResult {
    data_source: String,
    columns: Vec<ColumnDefinition>,
    cursor: Box<dyn RowCursor>,
}

impl ShardQueryResult {
    /// Builds the result from the head packets a shard answered with.
    pub fn new(
        data_source: impl Into<String>,
        packets: &CommandResponsePackets,
        cursor: Box<dyn RowCursor>,
    ) -> Self {
        Self::from_columns(data_source, packets.column_definitions().cloned().collect(), cursor)
    }

    pub fn from_columns(
        data_source: impl Into<String>,
        columns: Vec<ColumnDefinition>,
        cursor: Box<dyn RowCursor>,
    ) -> Self {
        Self {
            data_source: data_source.into(),
            columns,
            cursor,
        }
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    fn column(&self, index: usize) -> Result<&ColumnDefinition, MergeError> {
        index
            .checked_sub(1)
            .and_then(|i| self.columns.get(i))
            .ok_or_else(|| {
                MergeError::new(format!(
                    "Column index {} out of range for `{}` with {} columns",
                    index,
                    self.data_source,
                    self.columns.len()
                ))
            })
    }
}

impl std::fmt::Debug for ShardQueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardQueryResult")
            .field("data_source", &self.data_source)
            .field("columns", &self.columns.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QueryResult for ShardQueryResult {
    async fn next(&mut self) -> Result<bool, MergeError> {
        Ok(self.cursor.next().await?)
    }

    fn value(&self, index: usize, column_type: ColumnType) -> Result<Value, MergeError> {
        let raw = self.cursor.value(index)?;
        Ok(raw.coerce(column_type)?)
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_label(&self, index: usize) -> Result<&str, MergeError> {
        self.column(index).map(|c| c.label.as_str())
    }

    fn column_type(&self, index: usize) -> Result<ColumnType, MergeError> {
        self.column(index).map(|c| c.column_type)
    }
}
