use mosaic_core::{ProxyError, SqlType};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionMode {
    #[default]
    Local,
    /// Distributed (XA) transactions.
    Xa,
}

/// Statement admission rules that depend on the proxy's transaction mode.
#[derive(Debug, Default)]
pub struct TransactionPolicy {
    xa: AtomicBool,
}

impl TransactionPolicy {
    pub fn new(mode: TransactionMode) -> Self {
        Self {
            xa: AtomicBool::new(mode == TransactionMode::Xa),
        }
    }

    pub fn mode(&self) -> TransactionMode {
        if self.xa.load(Ordering::Acquire) {
            TransactionMode::Xa
        } else {
            TransactionMode::Local
        }
    }

    pub fn set_mode(&self, mode: TransactionMode) {
        self.xa.store(mode == TransactionMode::Xa, Ordering::Release);
    }

    /// Rejects schema changes while XA transactions are in effect.
    pub fn check(&self, sql_type: SqlType) -> Result<(), ProxyError> {
        if sql_type == SqlType::Ddl && self.mode() == TransactionMode::Xa {
            return Err(ProxyError::DdlUnderDistributedTransaction);
        }
        Ok(())
    }
}
