//! Per-visitor slot storage.
//!
//! The core record store works against a synchronous [`SlotStore`]. Each
//! request loads a [`SlotSnapshot`] holding the visitor's durable slots (from
//! Postgres or memory) and session slots (from the tower session), runs the
//! core against it, then flushes only the slots the core wrote.
//!
//! Load → mutate → flush runs under a per-visitor mutex, so two requests from
//! the same browser never interleave their read-modify-write cycles. The
//! mutex is per process.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use sqlx::PgPool;
use stride_core::interaction::{self, Interaction, Outcome};
use stride_core::{PersistenceError, RecordStore, Scope, SlotKey, SlotStore};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tower_sessions::Session;

use crate::db::{RepositoryError, SlotRepository};
use crate::models::VisitorId;

/// Visitors whose lock has been idle this long are forgotten.
const LOCK_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Upper bound on tracked visitor locks.
const MAX_TRACKED_VISITORS: u64 = 100_000;

/// Errors loading or flushing a visitor's slots.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("durable storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("session storage error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

// =============================================================================
// Durable backend
// =============================================================================

type MemorySlots = HashMap<VisitorId, HashMap<String, String>>;

/// Where durable-scope slots live.
#[derive(Clone)]
pub enum DurableStore {
    /// `storefront.visitor_slot` rows.
    Postgres(PgPool),
    /// Process memory; lost on restart.
    Memory(Arc<RwLock<MemorySlots>>),
}

impl DurableStore {
    /// An empty in-memory backend.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(Arc::default())
    }

    /// Backend name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// The connection pool, when Postgres-backed.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(pool) => Some(pool),
            Self::Memory(_) => None,
        }
    }

    /// Every durable slot stored for a visitor, keyed by slot key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    pub async fn load(&self, visitor: VisitorId) -> Result<HashMap<String, String>, RepositoryError> {
        match self {
            Self::Postgres(pool) => Ok(SlotRepository::new(pool)
                .load_all(visitor)
                .await?
                .into_iter()
                .map(|row| (row.slot_key, row.value))
                .collect()),
            Self::Memory(slots) => Ok(slots.read().await.get(&visitor).cloned().unwrap_or_default()),
        }
    }

    /// Replace the given slots for a visitor, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database write fails.
    pub async fn store(&self, visitor: VisitorId, slots: &[(&str, &str)]) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(pool) => SlotRepository::new(pool).upsert_many(visitor, slots).await,
            Self::Memory(memory) => {
                let mut memory = memory.write().await;
                let stored = memory.entry(visitor).or_default();
                for (key, value) in slots {
                    stored.insert((*key).to_owned(), (*value).to_owned());
                }
                Ok(())
            }
        }
    }

    /// Whether the backend can serve requests.
    pub async fn is_ready(&self) -> bool {
        match self {
            Self::Postgres(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            Self::Memory(_) => true,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// One visitor's slots, loaded for the duration of a request.
///
/// Writes land in the snapshot and are remembered as dirty until flushed.
#[derive(Debug, Default)]
pub struct SlotSnapshot {
    durable: HashMap<String, String>,
    session: HashMap<String, String>,
    dirty: BTreeSet<(Scope, String)>,
}

impl SlotSnapshot {
    const fn map(&self, scope: Scope) -> &HashMap<String, String> {
        match scope {
            Scope::Durable => &self.durable,
            Scope::Session => &self.session,
        }
    }

    /// Slots written since loading, grouped by scope.
    #[must_use]
    pub fn dirty(&self, scope: Scope) -> BTreeMap<&str, &str> {
        self.dirty
            .iter()
            .filter(|(dirty_scope, _)| *dirty_scope == scope)
            .filter_map(|(_, key)| {
                self.map(scope)
                    .get(key)
                    .map(|value| (key.as_str(), value.as_str()))
            })
            .collect()
    }

    /// Whether any slot was written.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}

impl SlotStore for SlotSnapshot {
    fn load_raw(&self, scope: Scope, key: &str) -> Option<String> {
        self.map(scope).get(key).cloned()
    }

    fn save_raw(&mut self, scope: Scope, key: &str, value: String) -> Result<(), PersistenceError> {
        let map = match scope {
            Scope::Durable => &mut self.durable,
            Scope::Session => &mut self.session,
        };
        map.insert(key.to_owned(), value);
        self.dirty.insert((scope, key.to_owned()));
        Ok(())
    }
}

// =============================================================================
// Storage service
// =============================================================================

/// Loads, locks and flushes visitor slots.
#[derive(Clone)]
pub struct SlotStorage {
    durable: DurableStore,
    locks: Cache<VisitorId, Arc<Mutex<()>>>,
}

impl SlotStorage {
    #[must_use]
    pub fn new(durable: DurableStore) -> Self {
        let locks = Cache::builder()
            .max_capacity(MAX_TRACKED_VISITORS)
            .time_to_idle(LOCK_IDLE_TIMEOUT)
            .build();
        Self { durable, locks }
    }

    /// The durable backend.
    #[must_use]
    pub const fn durable(&self) -> &DurableStore {
        &self.durable
    }

    /// Load a visitor's slots into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either backend cannot be read.
    pub async fn snapshot(&self, visitor: VisitorId, session: &Session) -> Result<SlotSnapshot, StorageError> {
        let durable = self.durable.load(visitor).await?;

        let mut session_slots = HashMap::new();
        for slot in SlotKey::in_scope(Scope::Session) {
            if let Some(value) = session.get::<String>(slot.as_str()).await? {
                session_slots.insert(slot.as_str().to_owned(), value);
            }
        }

        Ok(SlotSnapshot {
            durable,
            session: session_slots,
            dirty: BTreeSet::new(),
        })
    }

    /// Read-only access to a visitor's records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slots cannot be loaded.
    pub async fn read<R>(
        &self,
        visitor: VisitorId,
        session: &Session,
        f: impl FnOnce(&RecordStore<SlotSnapshot>) -> R,
    ) -> Result<R, StorageError> {
        let records = RecordStore::new(self.snapshot(visitor, session).await?);
        Ok(f(&records))
    }

    /// Run a mutation against a visitor's records and flush what it wrote.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slots cannot be loaded or flushed. When
    /// flushing fails nothing the mutation wrote is kept.
    pub async fn write<R>(
        &self,
        visitor: VisitorId,
        session: &Session,
        f: impl FnOnce(&mut RecordStore<SlotSnapshot>) -> R,
    ) -> Result<R, StorageError> {
        let lock = self
            .locks
            .get_with(visitor, async { Arc::new(Mutex::new(())) })
            .await;
        let _guard = lock.lock().await;

        let mut records = RecordStore::new(self.snapshot(visitor, session).await?);
        let result = f(&mut records);
        self.flush(visitor, session, &records.into_inner()).await?;

        Ok(result)
    }

    /// Submit one interaction for a visitor.
    ///
    /// Storage failures are reported the same way as a refused write: an
    /// error status and no view patches.
    pub async fn submit<I: Interaction>(
        &self,
        visitor: VisitorId,
        session: &Session,
        input: &I::Input,
        now: DateTime<Utc>,
    ) -> Outcome {
        self.submit_then::<I, _>(visitor, session, input, now, |_| ())
            .await
            .0
    }

    /// Submit one interaction, then read from the same locked snapshot.
    ///
    /// `after` sees the records exactly as the submission left them, so
    /// nothing another request writes can slip in between. It is `None`
    /// when loading or flushing failed.
    pub async fn submit_then<I: Interaction, R>(
        &self,
        visitor: VisitorId,
        session: &Session,
        input: &I::Input,
        now: DateTime<Utc>,
        after: impl FnOnce(&RecordStore<SlotSnapshot>) -> R,
    ) -> (Outcome, Option<R>) {
        let result = self
            .write(visitor, session, |records| {
                let outcome = interaction::submit::<I, _>(records, input, now);
                let extra = after(records);
                (outcome, extra)
            })
            .await;

        match result {
            Ok((outcome, extra)) => (outcome, Some(extra)),
            Err(error) => {
                let event_id = sentry::capture_error(&error);
                tracing::error!(
                    interaction = I::NAME,
                    %visitor,
                    error = %error,
                    sentry_event_id = %event_id,
                    "Failed to store submission"
                );
                (Outcome::write_failed(I::STATUS_TARGET), None)
            }
        }
    }

    async fn flush(
        &self,
        visitor: VisitorId,
        session: &Session,
        snapshot: &SlotSnapshot,
    ) -> Result<(), StorageError> {
        if !snapshot.is_dirty() {
            return Ok(());
        }

        let durable: Vec<(&str, &str)> = snapshot.dirty(Scope::Durable).into_iter().collect();
        self.durable.store(visitor, &durable).await?;

        for (key, value) in snapshot.dirty(Scope::Session) {
            session.insert(key, value).await?;
        }

        tracing::debug!(
            %visitor,
            backend = self.durable.kind(),
            durable = durable.len(),
            "Flushed visitor slots"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stride_core::Price;
    use tower_sessions::MemoryStore as SessionMemoryStore;

    use super::*;

    fn new_session() -> Session {
        Session::new(None, Arc::new(SessionMemoryStore::default()), None)
    }

    #[test]
    fn test_snapshot_tracks_dirty_slots_by_scope() {
        let mut snapshot = SlotSnapshot::default();
        snapshot
            .save_raw(Scope::Durable, "cartItems", "[]".to_string())
            .unwrap();
        snapshot
            .save_raw(Scope::Session, "customProgram", "{}".to_string())
            .unwrap();
        snapshot
            .save_raw(Scope::Durable, "cartItems", "[1]".to_string())
            .unwrap();

        let durable = snapshot.dirty(Scope::Durable);
        assert_eq!(durable.len(), 1);
        assert_eq!(durable.get("cartItems"), Some(&"[1]"));
        assert_eq!(snapshot.dirty(Scope::Session).len(), 1);
        assert_eq!(snapshot.load_raw(Scope::Session, "customProgram").as_deref(), Some("{}"));
        assert!(snapshot.load_raw(Scope::Session, "cartItems").is_none());
    }

    #[tokio::test]
    async fn test_write_flushes_durable_slots() {
        let storage = SlotStorage::new(DurableStore::memory());
        let visitor = VisitorId::generate();
        let session = new_session();

        storage
            .write(visitor, &session, |records| {
                records.add_to_cart("Yoga Mat", Price::from_cents(2000))
            })
            .await
            .unwrap()
            .unwrap();

        let cart = storage
            .read(visitor, &session, RecordStore::cart)
            .await
            .unwrap();
        assert_eq!(cart.len(), 1);

        let other = storage
            .read(VisitorId::generate(), &session, RecordStore::cart)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_session_slots_live_in_session() {
        let storage = SlotStorage::new(DurableStore::memory());
        let visitor = VisitorId::generate();
        let session = new_session();

        storage
            .write(visitor, &session, |records| {
                records.save_custom_program(&stride_core::CustomProgram {
                    goal: "strength".to_string(),
                    days_per_week: "3".to_string(),
                    intensity: "high".to_string(),
                    preferences: String::new(),
                })
            })
            .await
            .unwrap()
            .unwrap();

        assert!(session.get::<String>("customProgram").await.unwrap().is_some());
        assert!(storage.durable().load(visitor).await.unwrap().is_empty());

        let fresh = SlotStorage::new(storage.durable().clone());
        let program = fresh
            .read(visitor, &new_session(), RecordStore::custom_program)
            .await
            .unwrap();
        assert!(program.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_adds_both_count() {
        let storage = SlotStorage::new(DurableStore::memory());
        let visitor = VisitorId::generate();
        let session = new_session();

        let add = || {
            storage.write(visitor, &session, |records| {
                records.add_to_cart("Jump Rope", Price::from_cents(800))
            })
        };
        let (a, b) = tokio::join!(add(), add());
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let cart = storage
            .read(visitor, &session, RecordStore::cart)
            .await
            .unwrap();
        assert_eq!(cart[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_submit_then_reads_under_the_same_lock() {
        use stride_core::cart_item_count;
        use stride_core::interaction::{AddToCart, AddToCartInput, Disposition};

        let storage = SlotStorage::new(DurableStore::memory());
        let visitor = VisitorId::generate();
        let session = new_session();
        let input = AddToCartInput {
            name: Some("Jump Rope".to_string()),
            price: Some("8.00".to_string()),
        };
        let add = || {
            storage.submit_then::<AddToCart, _>(visitor, &session, &input, Utc::now(), |records| {
                cart_item_count(&records.cart())
            })
        };

        let (first, second) = tokio::join!(add(), add());
        assert_eq!(first.0.disposition, Disposition::Applied);
        assert_eq!(second.0.disposition, Disposition::Applied);

        let mut counts = [first.1.unwrap(), second.1.unwrap()];
        counts.sort_unstable();
        assert_eq!(counts, [1, 2]);
    }
}
