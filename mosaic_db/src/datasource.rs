use dashmap::DashMap;
use mosaic_core::ConnectionSource;
use std::sync::Arc;

/// Connection sources keyed by data source name.
#[derive(Default)]
pub struct DataSourceRegistry {
    sources: DashMap<String, Arc<dyn ConnectionSource>>,
}

impl DataSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source` under `name`, returning the source it replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        source: Arc<dyn ConnectionSource>,
    ) -> Option<Arc<dyn ConnectionSource>> {
        self.sources.insert(name.into(), source)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ConnectionSource>> {
        self.sources.get(name).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn ConnectionSource>> {
        self.sources.remove(name).map(|(_, source)| source)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for DataSourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceRegistry")
            .field("sources", &self.names())
            .finish()
    }
}
