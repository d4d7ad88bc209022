use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Prepared statement ids handed out to clients, mapped to their SQL text.
///
/// Registering the same SQL twice returns the same id.
#[derive(Debug)]
pub struct StatementRegistry {
    next_id: AtomicU32,
    ids: DashMap<Arc<str>, u32>,
    statements: DashMap<u32, Arc<str>>,
}

impl Default for StatementRegistry {
    fn default() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            ids: DashMap::new(),
            statements: DashMap::new(),
        }
    }
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, sql: &str) -> u32 {
        let sql: Arc<str> = Arc::from(sql);
        *self.ids.entry(sql.clone()).or_insert_with(|| {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            self.statements.insert(id, sql);
            id
        })
    }

    pub fn sql(&self, statement_id: u32) -> Option<Arc<str>> {
        self.statements.get(&statement_id).map(|sql| sql.value().clone())
    }

    /// Forgets a statement. Returns `false` for an unknown id.
    pub fn remove(&self, statement_id: u32) -> bool {
        match self.statements.remove(&statement_id) {
            Some((_, sql)) => {
                self.ids.remove(&sql);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
