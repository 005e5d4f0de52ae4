//! In-memory slot store.

use std::collections::HashMap;

use super::{PersistenceError, Scope, SlotStore};

/// A [`SlotStore`] backed by two hash maps.
///
/// Models a single browser: durable slots persist for the lifetime of the
/// value, session slots are dropped by [`MemoryStore::end_session`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    durable: HashMap<String, String>,
    session: HashMap<String, String>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every session-scoped slot, as when the tab is closed.
    pub fn end_session(&mut self) {
        self.session.clear();
    }

    /// Number of slots held in `scope`.
    #[must_use]
    pub fn len(&self, scope: Scope) -> usize {
        self.scope(scope).len()
    }

    /// Whether `scope` holds no slots.
    #[must_use]
    pub fn is_empty(&self, scope: Scope) -> bool {
        self.scope(scope).is_empty()
    }

    const fn scope(&self, scope: Scope) -> &HashMap<String, String> {
        match scope {
            Scope::Durable => &self.durable,
            Scope::Session => &self.session,
        }
    }
}

impl SlotStore for MemoryStore {
    fn load_raw(&self, scope: Scope, key: &str) -> Option<String> {
        self.scope(scope).get(key).cloned()
    }

    fn save_raw(&mut self, scope: Scope, key: &str, value: String) -> Result<(), PersistenceError> {
        let map = match scope {
            Scope::Durable => &mut self.durable,
            Scope::Session => &mut self.session,
        };
        map.insert(key.to_owned(), value);
        Ok(())
    }
}
