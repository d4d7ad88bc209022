use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Statement class as reported by the SQL classifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SqlType {
    /// SELECT and friends
    Dql,
    /// INSERT, UPDATE, DELETE
    Dml,
    /// CREATE, ALTER, DROP, TRUNCATE
    Ddl,
    /// BEGIN, COMMIT, ROLLBACK, SET AUTOCOMMIT
    Tcl,
    /// SHOW, DESCRIBE
    Dal,
    /// GRANT, REVOKE
    Dcl,
}

impl SqlType {
    /// Statements whose shard responses are row streams to be merged.
    pub fn is_row_producing(&self) -> bool {
        matches!(self, SqlType::Dql | SqlType::Dal)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY item, addressed by its 1-based position in the projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub index: usize,
    pub direction: OrderDirection,
}

impl OrderItem {
    pub fn asc(index: usize) -> Self {
        Self {
            index,
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(index: usize) -> Self {
        Self {
            index,
            direction: OrderDirection::Desc,
        }
    }
}

/// LIMIT/OFFSET of the logical statement, applied after the shards are merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u64,
    pub row_count: Option<u64>,
}

/// A classified statement: what kind it is plus what the merge step needs to know.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlStatement {
    pub sql_type: SqlType,
    /// INSERT statements ask the backend for generated keys.
    pub insert: bool,
    pub order_by: Vec<OrderItem>,
    pub pagination: Option<Pagination>,
}

impl SqlStatement {
    pub fn new(sql_type: SqlType) -> Self {
        Self {
            sql_type,
            insert: false,
            order_by: Vec::new(),
            pagination: None,
        }
    }

    pub fn insert() -> Self {
        Self {
            insert: true,
            ..Self::new(SqlType::Dml)
        }
    }

    pub fn order_by(mut self, item: OrderItem) -> Self {
        self.order_by.push(item);
        self
    }

    pub fn limit(mut self, offset: u64, row_count: Option<u64>) -> Self {
        self.pagination = Some(Pagination { offset, row_count });
        self
    }
}
