//! Persistence adapter over durable and session scopes.
//!
//! A [`SlotStore`] is a dumb text key-value store split into two scopes. The
//! [`Persistence`] adapter layered on top serializes records to JSON on write
//! and parses them on read.
//!
//! # Scopes
//!
//! - [`Scope::Durable`] survives browser restarts (the storefront keys it by a
//!   long-lived visitor cookie).
//! - [`Scope::Session`] is dropped when the browsing session ends.
//!
//! Writes are synchronous: a `save` followed by a `load` on the same store
//! observes the written value.

pub mod memory;

use core::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use memory::MemoryStore;

/// Lifetime of a persisted slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Survives browser restarts.
    Durable,
    /// Cleared when the browsing session ends.
    Session,
}

impl Scope {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The named slots the storefront persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// Cart line items (durable list).
    CartItems,
    /// Newsletter sign-ups (durable list).
    Subscribers,
    /// Feedback cards (durable list).
    FeedbackEntries,
    /// Custom program selections (session singleton).
    CustomProgram,
}

impl SlotKey {
    /// Every slot, in a stable order.
    pub const ALL: [Self; 4] = [
        Self::CartItems,
        Self::Subscribers,
        Self::FeedbackEntries,
        Self::CustomProgram,
    ];

    /// The storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CartItems => "cartItems",
            Self::Subscribers => "subscribers",
            Self::FeedbackEntries => "feedbackEntries",
            Self::CustomProgram => "customProgram",
        }
    }

    /// The scope this slot lives in.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        match self {
            Self::CartItems | Self::Subscribers | Self::FeedbackEntries => Scope::Durable,
            Self::CustomProgram => Scope::Session,
        }
    }

    /// Look up a slot by its storage key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == key)
    }

    /// All slots living in `scope`.
    pub fn in_scope(scope: Scope) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |slot| slot.scope() == scope)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the persistence adapter.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Stored text could not be parsed into the expected record shape.
    #[error("slot {key} holds undecodable data: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized.
    #[error("failed to encode value for slot {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing store refused the write.
    #[error("failed to write slot {key}: {reason}")]
    Write { key: String, reason: String },
}

/// Raw text storage split by [`Scope`].
///
/// Implementations must make a successful `save_raw` visible to the next
/// `load_raw` on the same value.
pub trait SlotStore {
    /// Read the raw text in a slot, if any.
    fn load_raw(&self, scope: Scope, key: &str) -> Option<String>;

    /// Replace the raw text in a slot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Write` if the backend cannot store the value.
    fn save_raw(&mut self, scope: Scope, key: &str, value: String) -> Result<(), PersistenceError>;
}

impl<S: SlotStore + ?Sized> SlotStore for &mut S {
    fn load_raw(&self, scope: Scope, key: &str) -> Option<String> {
        (**self).load_raw(scope, key)
    }

    fn save_raw(&mut self, scope: Scope, key: &str, value: String) -> Result<(), PersistenceError> {
        (**self).save_raw(scope, key, value)
    }
}

/// JSON adapter over a [`SlotStore`].
#[derive(Debug, Clone, Default)]
pub struct Persistence<S> {
    store: S,
}

impl<S: SlotStore> Persistence<S> {
    /// Wrap a slot store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load and decode the value in a slot.
    ///
    /// Returns `Ok(None)` when the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Decode` if the stored text is not valid JSON
    /// for `T`.
    pub fn load<T: DeserializeOwned>(
        &self,
        scope: Scope,
        key: &str,
    ) -> Result<Option<T>, PersistenceError> {
        let Some(raw) = self.store.load_raw(scope, key) else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PersistenceError::Decode {
                key: key.to_owned(),
                source,
            })
    }

    /// Encode and store a value.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Encode` if serialization fails, or whatever
    /// the backing store returns on write failure.
    pub fn save<T: Serialize + ?Sized>(
        &mut self,
        scope: Scope,
        key: &str,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(value).map_err(|source| PersistenceError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.store.save_raw(scope, key, raw)
    }

    /// Borrow the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Unwrap the backing store.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keys_and_scopes() {
        assert_eq!(SlotKey::CartItems.as_str(), "cartItems");
        assert_eq!(SlotKey::CustomProgram.scope(), Scope::Session);
        assert_eq!(SlotKey::from_key("feedbackEntries"), Some(SlotKey::FeedbackEntries));
        assert_eq!(SlotKey::from_key("nope"), None);

        let durable: Vec<_> = SlotKey::in_scope(Scope::Durable).collect();
        assert_eq!(
            durable,
            vec![SlotKey::CartItems, SlotKey::Subscribers, SlotKey::FeedbackEntries]
        );
    }

    #[test]
    fn test_load_absent_is_none() {
        let persistence = Persistence::new(MemoryStore::new());
        let value: Option<Vec<String>> = persistence.load(Scope::Durable, "missing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence
            .save(Scope::Durable, "k", &vec![1_u32, 2, 3])
            .unwrap();
        let value: Option<Vec<u32>> = persistence.load(Scope::Durable, "k").unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_scopes_are_separate() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save(Scope::Session, "k", "session").unwrap();
        let durable: Option<String> = persistence.load(Scope::Durable, "k").unwrap();
        assert!(durable.is_none());
    }

    #[test]
    fn test_malformed_text_is_decode_error() {
        let mut store = MemoryStore::new();
        store
            .save_raw(Scope::Durable, "k", "{not json".to_string())
            .unwrap();
        let persistence = Persistence::new(store);
        let result: Result<Option<Vec<u32>>, _> = persistence.load(Scope::Durable, "k");
        assert!(matches!(result, Err(PersistenceError::Decode { .. })));
    }
}
