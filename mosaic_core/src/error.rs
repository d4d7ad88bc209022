use crate::packet::ErrPacket;
use crate::types::{ColumnType, Value};
use thiserror::Error;

/// SQLSTATE used when no backend-reported state applies.
pub const GENERAL_SQL_STATE: &str = "HY000";

/// Error reported by a backend database (code, SQLSTATE and message as sent by the server).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}][{sql_state}] {message}")]
pub struct BackendError {
    pub code: u16,
    pub sql_state: String,
    pub message: String,
}

impl BackendError {
    pub fn new(code: u16, sql_state: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            sql_state: sql_state.into(),
            message: message.into(),
        }
    }

    pub fn to_err_packet(&self, sequence_id: u32) -> ErrPacket {
        ErrPacket::new(sequence_id, self.code, &self.sql_state, &self.message)
    }
}

/// A value could not be read in the representation its column declares.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot convert {value:?} to {target}")]
pub struct ConversionError {
    pub value: Value,
    pub target: ColumnType,
}

impl ConversionError {
    pub fn new(value: Value, target: ColumnType) -> Self {
        Self { value, target }
    }
}

/// Error raised by the merge engine while building or reading a merged row source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Merge failed: [{code}][{sql_state}] {message}")]
pub struct MergeError {
    pub code: u16,
    pub sql_state: String,
    pub message: String,
}

impl MergeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            sql_state: GENERAL_SQL_STATE.to_string(),
            message: message.into(),
        }
    }

    pub fn to_err_packet(&self, sequence_id: u32) -> ErrPacket {
        ErrPacket::new(sequence_id, self.code, &self.sql_state, &self.message)
    }
}

impl From<BackendError> for MergeError {
    fn from(e: BackendError) -> Self {
        Self {
            code: e.code,
            sql_state: e.sql_state,
            message: e.message,
        }
    }
}

impl From<ConversionError> for MergeError {
    fn from(e: ConversionError) -> Self {
        Self {
            code: 0,
            // invalid character value for cast specification
            sql_state: "22018".to_string(),
            message: e.to_string(),
        }
    }
}

/// Command-level error of the execution core.
#[derive(Error, Debug, Clone)]
pub enum ProxyError {
    #[error("DDL command can't execute in XA transaction mode")]
    DdlUnderDistributedTransaction,

    #[error("Backend `{data_source}` unavailable: {reason}")]
    BackendUnavailable { data_source: String, reason: String },

    #[error("Backend `{data_source}` refused the connection: {source}")]
    ConnectionRefused {
        data_source: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to prepare statement on `{data_source}`: {source}")]
    PrepareFailed {
        data_source: String,
        #[source]
        source: BackendError,
    },

    #[error("Shard execution failed: {0}")]
    Infrastructure(String),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Unknown prepared statement id {0}")]
    UnknownStatement(u32),

    #[error("Routing failed: {0}")]
    Routing(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    pub fn backend_unavailable(data_source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            data_source: data_source.into(),
            reason: reason.into(),
        }
    }

    /// Maps the error onto the single error packet a failed command answers with.
    pub fn to_err_packet(&self, sequence_id: u32) -> ErrPacket {
        match self {
            ProxyError::PrepareFailed { source, .. } | ProxyError::ConnectionRefused { source, .. } => {
                ErrPacket::new(sequence_id, source.code, &source.sql_state, &self.to_string())
            }
            ProxyError::Merge(e) => e.to_err_packet(sequence_id),
            other => ErrPacket::new(sequence_id, 0, GENERAL_SQL_STATE, &other.to_string()),
        }
    }
}
