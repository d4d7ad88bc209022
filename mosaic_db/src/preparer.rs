use crate::datasource::DataSourceRegistry;
use crate::resource::ResourceSet;
use mosaic_core::{BackendStatement, PrepareOptions, ProxyError, SqlStatement};
use std::sync::Arc;
use tracing::debug;

/// A statement prepared on one shard, ready to be executed.
#[derive(Clone)]
pub struct PreparedUnit {
    pub data_source: String,
    pub statement: Arc<dyn BackendStatement>,
}

impl std::fmt::Debug for PreparedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedUnit")
            .field("data_source", &self.data_source)
            .finish_non_exhaustive()
    }
}

/// Acquires a connection per execution unit and prepares the unit's SQL on it.
#[derive(Clone, Debug)]
pub struct StatementPreparer {
    data_sources: Arc<DataSourceRegistry>,
}

impl StatementPreparer {
    pub fn new(data_sources: Arc<DataSourceRegistry>) -> Self {
        Self { data_sources }
    }

    /// Prepares `sql` on `data_source`.
    ///
    /// The connection is registered in `resources` before preparing, so a
    /// rejected statement still leaves its connection to be released.
    pub async fn prepare(
        &self,
        resources: &mut ResourceSet,
        data_source: &str,
        sql: &str,
        statement: &SqlStatement,
    ) -> Result<PreparedUnit, ProxyError> {
        let source = self.data_sources.get(data_source).ok_or_else(|| {
            ProxyError::backend_unavailable(data_source, "no connection source registered")
        })?;
        let connection = source
            .connection()
            .await
            .map_err(|source| ProxyError::ConnectionRefused {
                data_source: data_source.to_string(),
                source,
            })?;
        resources.add_connection(connection.clone());

        let options = PrepareOptions {
            return_generated_keys: statement.insert,
        };
        let prepared = connection
            .prepare(sql, options)
            .await
            .map_err(|source| ProxyError::PrepareFailed {
                data_source: data_source.to_string(),
                source,
            })?;
        resources.add_statement(prepared.clone());
        debug!(data_source, sql, "Prepared statement");

        Ok(PreparedUnit {
            data_source: data_source.to_string(),
            statement: prepared,
        })
    }
}
