use mosaic_core::{BackendConnection, BackendStatement};
use std::sync::Arc;
use tracing::debug;

/// Backend connections and statements opened on behalf of one command.
///
/// Everything registered is closed by the next [`ResourceSet::release`], and
/// on drop if the command never released explicitly. Each resource is closed
/// at most once.
#[derive(Default)]
pub struct ResourceSet {
    connections: Vec<Arc<dyn BackendConnection>>,
    statements: Vec<Arc<dyn BackendStatement>>,
    releases: usize,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_connection(&mut self, connection: Arc<dyn BackendConnection>) {
        self.connections.push(connection);
    }

    pub fn add_statement(&mut self, statement: Arc<dyn BackendStatement>) {
        self.statements.push(statement);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty() && self.statements.is_empty()
    }

    /// Number of releases that actually closed something.
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Closes statements, then connections. Returns `false` when there was nothing to close.
    pub fn release(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        let statements = std::mem::take(&mut self.statements);
        let connections = std::mem::take(&mut self.connections);
        debug!(
            statements = statements.len(),
            connections = connections.len(),
            "Releasing command resources"
        );
        for statement in statements {
            statement.close();
        }
        for connection in connections {
            connection.close();
        }
        self.releases += 1;
        true
    }
}

impl Drop for ResourceSet {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSet")
            .field("connections", &self.connections.len())
            .field("statements", &self.statements.len())
            .field("releases", &self.releases)
            .finish()
    }
}
