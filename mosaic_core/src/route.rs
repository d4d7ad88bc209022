//! Routing output and the router seams the core consumes.

use crate::error::ProxyError;
use crate::types::{SqlStatement, SqlType, Value};
use serde::{Deserialize, Serialize};

/// One backend call: the data source to run on and the SQL rewritten for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionUnit {
    pub data_source: String,
    pub sql: String,
}

impl ExecutionUnit {
    pub fn new(data_source: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            sql: sql.into(),
        }
    }
}

/// The classified statement plus the units it was routed to. No units means no-op.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResult {
    pub statement: SqlStatement,
    pub units: Vec<ExecutionUnit>,
}

impl RouteResult {
    pub fn new(statement: SqlStatement, units: Vec<ExecutionUnit>) -> Self {
        Self { statement, units }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Computes the execution units of a parameterized statement under the sharding rules.
pub trait ShardingRouter: Send + Sync {
    fn route(&self, sql: &str, parameters: &[Value]) -> Result<RouteResult, ProxyError>;
}

/// Picks the single data source of a master-slave deployment.
pub trait MasterSlaveRouter: Send + Sync {
    fn route(&self, sql_type: SqlType) -> String;
}

/// Classifies SQL text without routing it.
pub trait StatementJudge: Send + Sync {
    fn judge(&self, sql: &str) -> Result<SqlStatement, ProxyError>;
}
