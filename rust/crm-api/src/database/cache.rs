//! Coarse read cache for list queries.
//!
//! Keyed by (entity table, scope), where scope is the owning user for
//! owner-scoped entities and the client id for interactions. Any mutation
//! of an entity kind invalidates every cached list of that kind - no
//! per-row tracking, matching the small per-tenant data volumes this
//! service is built for.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::Table;

/// Cache of serialized list results.
#[derive(Debug, Clone, Default)]
pub struct ListCache {
    entries: Arc<RwLock<HashMap<(Table, String), Arc<Vec<Value>>>>>,
}

impl ListCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list for (table, scope), if any.
    #[must_use]
    pub fn get(&self, table: Table, scope: &str) -> Option<Arc<Vec<Value>>> {
        self.entries.read().get(&(table, scope.to_string())).cloned()
    }

    /// Store a list result.
    pub fn put(&self, table: Table, scope: &str, docs: Vec<Value>) {
        self.entries
            .write()
            .insert((table, scope.to_string()), Arc::new(docs));
    }

    /// Drop every cached list of this entity kind, across all scopes.
    pub fn invalidate(&self, table: Table) {
        self.entries.write().retain(|(t, _), _| *t != table);
    }
}
