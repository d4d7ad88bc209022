use crate::types::{ColumnType, Value};
use serde::{Deserialize, Serialize};

/// A bound parameter of a prepared statement execution, with its declared wire type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreparedStatementParameter {
    pub column_type: ColumnType,
    pub value: Value,
}

impl PreparedStatementParameter {
    pub fn new(column_type: ColumnType, value: impl Into<Value>) -> Self {
        Self {
            column_type,
            value: value.into(),
        }
    }

    /// Values in binding order, as handed to the router and the backend.
    pub fn values(parameters: &[PreparedStatementParameter]) -> Vec<Value> {
        parameters.iter().map(|p| p.value.clone()).collect()
    }
}
