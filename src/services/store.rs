//! In-memory [`MovieStore`].

use super::MovieStore;
use crate::model::CanonicalMovie;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<String, CanonicalMovie>,
    id_by_source: HashMap<String, String>,
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MovieStore for MemoryStore {
    /// Insert or replace by id. Records without a slug are ignored.
    fn put(&self, movie: CanonicalMovie, source_url: Option<&str>) {
        if !movie.is_usable() {
            tracing::debug!(title = %movie.title, "not storing movie without slug");
            return;
        }
        // A poisoned lock only means another writer panicked; the maps are still consistent.
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(url) = source_url {
            inner.id_by_source.insert(url.to_string(), movie.id.clone());
        }
        inner.by_id.insert(movie.id.clone(), movie);
    }

    fn get(&self, id: &str) -> Option<CanonicalMovie> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.by_id.get(id).cloned()
    }

    fn get_by_source_url(&self, url: &str) -> Option<CanonicalMovie> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let id = inner.id_by_source.get(url)?;
        inner.by_id.get(id).cloned()
    }
}
