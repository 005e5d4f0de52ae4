//! Typed record collections on top of the persistence adapter.
//!
//! Every collection is addressed through a typed slot handle, which fixes both
//! the storage key (and therefore its [`Scope`](crate::Scope)) and the record
//! type stored there:
//!
//! | Handle | Key | Scope | Semantics |
//! |---|---|---|---|
//! | [`CART_ITEMS`] | `cartItems` | durable | upsert by name |
//! | [`SUBSCRIBERS`] | `subscribers` | durable | append-only |
//! | [`FEEDBACK_ENTRIES`] | `feedbackEntries` | durable | append-only |
//! | [`CUSTOM_PROGRAM`] | `customProgram` | session | overwrite |
//!
//! Reads never fail: an absent or undecodable slot reads as empty. Mutations
//! run a full read-modify-write before returning, and take `&mut self`, so two
//! mutations on the same store cannot interleave.

use core::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::persistence::{Persistence, PersistenceError, SlotKey, SlotStore};
use crate::types::{CartLineItem, CustomProgram, FeedbackEntry, Price, Subscriber};

/// A slot holding an ordered list of `T`.
#[derive(Debug)]
pub struct ListSlot<T> {
    key: SlotKey,
    record: PhantomData<fn() -> T>,
}

/// A slot holding at most one `T`.
#[derive(Debug)]
pub struct SingletonSlot<T> {
    key: SlotKey,
    record: PhantomData<fn() -> T>,
}

macro_rules! impl_slot_handle {
    ($handle:ident) => {
        impl<T> $handle<T> {
            /// Bind a handle to a slot key.
            #[must_use]
            pub const fn new(key: SlotKey) -> Self {
                Self {
                    key,
                    record: PhantomData,
                }
            }

            /// The slot this handle addresses.
            #[must_use]
            pub const fn key(&self) -> SlotKey {
                self.key
            }
        }

        impl<T> Clone for $handle<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $handle<T> {}
    };
}

impl_slot_handle!(ListSlot);
impl_slot_handle!(SingletonSlot);

pub const CART_ITEMS: ListSlot<CartLineItem> = ListSlot::new(SlotKey::CartItems);
pub const SUBSCRIBERS: ListSlot<Subscriber> = ListSlot::new(SlotKey::Subscribers);
pub const FEEDBACK_ENTRIES: ListSlot<FeedbackEntry> = ListSlot::new(SlotKey::FeedbackEntries);
pub const CUSTOM_PROGRAM: SingletonSlot<CustomProgram> = SingletonSlot::new(SlotKey::CustomProgram);

/// Typed accessors over one visitor's slots.
#[derive(Debug, Clone, Default)]
pub struct RecordStore<S> {
    persistence: Persistence<S>,
}

impl<S: SlotStore> RecordStore<S> {
    /// Build a record store over a slot store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            persistence: Persistence::new(store),
        }
    }

    /// Borrow the backing slot store.
    #[must_use]
    pub const fn store(&self) -> &S {
        self.persistence.store()
    }

    /// Unwrap the backing slot store.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.persistence.into_inner()
    }

    // =========================================================================
    // Generic operations
    // =========================================================================

    /// Every record in a list slot, in insertion order.
    ///
    /// Absent and undecodable slots both read as an empty list.
    #[must_use]
    pub fn get_all<T: DeserializeOwned>(&self, slot: ListSlot<T>) -> Vec<T> {
        let key = slot.key();
        match self.persistence.load(key.scope(), key.as_str()) {
            Ok(items) => items.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(slot = %key, %error, "Treating undecodable slot as empty");
                Vec::new()
            }
        }
    }

    /// Append a record to the end of a list slot.
    ///
    /// Duplicates are never rejected.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the updated list cannot be written.
    pub fn append_only<T>(&mut self, slot: ListSlot<T>, item: T) -> Result<(), PersistenceError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut items = self.get_all(slot);
        items.push(item);
        self.write_list(slot, &items)
    }

    /// Merge a record into a list slot by key.
    ///
    /// If an element with the same `key_fn` value exists, `on_match` is applied
    /// to it and `item` is discarded. Otherwise `item` is appended. Returns the
    /// element as stored.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the updated list cannot be written.
    pub fn upsert_by_key<T, K, F, M>(
        &mut self,
        slot: ListSlot<T>,
        item: T,
        key_fn: F,
        on_match: M,
    ) -> Result<T, PersistenceError>
    where
        T: Serialize + DeserializeOwned + Clone,
        K: PartialEq,
        F: Fn(&T) -> K,
        M: FnOnce(&mut T),
    {
        let mut items = self.get_all(slot);
        let key = key_fn(&item);

        let stored = if let Some(existing) = items.iter_mut().find(|e| key_fn(e) == key) {
            on_match(existing);
            existing.clone()
        } else {
            items.push(item.clone());
            item
        };

        self.write_list(slot, &items)?;
        Ok(stored)
    }

    /// The value in a singleton slot, if any.
    ///
    /// Undecodable slots read as absent.
    #[must_use]
    pub fn get_singleton<T: DeserializeOwned>(&self, slot: SingletonSlot<T>) -> Option<T> {
        let key = slot.key();
        self.persistence
            .load(key.scope(), key.as_str())
            .unwrap_or_else(|error| {
                tracing::warn!(slot = %key, %error, "Treating undecodable slot as absent");
                None
            })
    }

    /// Overwrite a singleton slot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the value cannot be written.
    pub fn set_singleton<T: Serialize>(
        &mut self,
        slot: SingletonSlot<T>,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let key = slot.key();
        self.persistence.save(key.scope(), key.as_str(), value)
    }

    fn write_list<T: Serialize>(
        &mut self,
        slot: ListSlot<T>,
        items: &[T],
    ) -> Result<(), PersistenceError> {
        let key = slot.key();
        self.persistence.save(key.scope(), key.as_str(), items)
    }

    // =========================================================================
    // Collection accessors
    // =========================================================================

    /// Cart line items in first-add order.
    #[must_use]
    pub fn cart(&self) -> Vec<CartLineItem> {
        self.get_all(CART_ITEMS)
    }

    /// Add one unit of a product to the cart.
    ///
    /// An existing line item with the same name gains one unit and keeps its
    /// original price; otherwise a new line item with quantity 1 is appended.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the cart cannot be written.
    pub fn add_to_cart(
        &mut self,
        name: &str,
        price: Price,
    ) -> Result<CartLineItem, PersistenceError> {
        self.upsert_by_key(
            CART_ITEMS,
            CartLineItem::new(name, price),
            |item| item.name.clone(),
            |existing| existing.quantity = existing.quantity.saturating_add(1),
        )
    }

    /// Newsletter subscribers in sign-up order.
    #[must_use]
    pub fn subscribers(&self) -> Vec<Subscriber> {
        self.get_all(SUBSCRIBERS)
    }

    /// Record a newsletter sign-up.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the list cannot be written.
    pub fn add_subscriber(&mut self, subscriber: Subscriber) -> Result<(), PersistenceError> {
        self.append_only(SUBSCRIBERS, subscriber)
    }

    /// Feedback entries in submission order.
    #[must_use]
    pub fn feedback(&self) -> Vec<FeedbackEntry> {
        self.get_all(FEEDBACK_ENTRIES)
    }

    /// Record a feedback entry.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the list cannot be written.
    pub fn add_feedback(&mut self, entry: FeedbackEntry) -> Result<(), PersistenceError> {
        self.append_only(FEEDBACK_ENTRIES, entry)
    }

    /// This session's custom program, if one was submitted.
    #[must_use]
    pub fn custom_program(&self) -> Option<CustomProgram> {
        self.get_singleton(CUSTOM_PROGRAM)
    }

    /// Replace this session's custom program.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the record cannot be written.
    pub fn save_custom_program(&mut self, program: &CustomProgram) -> Result<(), PersistenceError> {
        self.set_singleton(CUSTOM_PROGRAM, program)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::persistence::{MemoryStore, Scope};

    fn store() -> RecordStore<MemoryStore> {
        RecordStore::new(MemoryStore::new())
    }

    fn program(goal: &str) -> CustomProgram {
        CustomProgram {
            goal: goal.to_string(),
            days_per_week: "3".to_string(),
            intensity: "moderate".to_string(),
            preferences: String::new(),
        }
    }

    #[test]
    fn test_empty_store_reads_empty() {
        let records = store();
        assert!(records.cart().is_empty());
        assert!(records.subscribers().is_empty());
        assert!(records.feedback().is_empty());
        assert!(records.custom_program().is_none());
    }

    #[test]
    fn test_repeated_add_accumulates_quantity_and_keeps_first_price() {
        let mut records = store();
        records.add_to_cart("Yoga Mat", Price::from_cents(2000)).unwrap();
        records.add_to_cart("Yoga Mat", Price::from_cents(2500)).unwrap();
        let stored = records.add_to_cart("Yoga Mat", Price::from_cents(1)).unwrap();

        assert_eq!(stored.quantity, 3);
        assert_eq!(stored.price, Price::from_cents(2000));

        let cart = records.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0], stored);
    }

    #[test]
    fn test_distinct_names_keep_first_seen_order() {
        let mut records = store();
        for name in ["Kettlebell", "Foam Roller", "Jump Rope"] {
            records.add_to_cart(name, Price::from_cents(999)).unwrap();
        }

        let cart = records.cart();
        let names: Vec<_> = cart.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Kettlebell", "Foam Roller", "Jump Rope"]);
        assert!(cart.iter().all(|item| item.quantity == 1));
    }

    #[test]
    fn test_mixed_cart_scenario() {
        let mut records = store();
        records.add_to_cart("Yoga Mat", Price::from_cents(2000)).unwrap();
        records.add_to_cart("Yoga Mat", Price::from_cents(2000)).unwrap();
        records.add_to_cart("Water Bottle", Price::from_cents(550)).unwrap();

        assert_eq!(
            records.cart(),
            vec![
                CartLineItem {
                    name: "Yoga Mat".to_string(),
                    price: Price::from_cents(2000),
                    quantity: 2,
                },
                CartLineItem::new("Water Bottle", Price::from_cents(550)),
            ]
        );
    }

    #[test]
    fn test_subscribers_allow_duplicates() {
        let mut records = store();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        for _ in 0..2 {
            records
                .add_subscriber(Subscriber {
                    email: "runner@example.com".to_string(),
                    subscribed_at: at,
                })
                .unwrap();
        }
        assert_eq!(records.subscribers().len(), 2);
    }

    #[test]
    fn test_feedback_appends_in_order() {
        let mut records = store();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        for name in ["Ana", "Lee"] {
            records
                .add_feedback(FeedbackEntry {
                    name: name.to_string(),
                    rating: "5".to_string(),
                    comments: String::new(),
                    submitted_at: at,
                })
                .unwrap();
        }
        let names: Vec<_> = records.feedback().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["Ana", "Lee"]);
    }

    #[test]
    fn test_custom_program_overwrites() {
        let mut records = store();
        records.save_custom_program(&program("strength")).unwrap();
        records.save_custom_program(&program("mobility")).unwrap();
        assert_eq!(records.custom_program(), Some(program("mobility")));
    }

    #[test]
    fn test_session_end_drops_program_but_keeps_cart() {
        let mut records = store();
        records.add_to_cart("Yoga Mat", Price::from_cents(2000)).unwrap();
        records.save_custom_program(&program("strength")).unwrap();

        let mut backing = records.into_inner();
        backing.end_session();
        let records = RecordStore::new(backing);

        assert_eq!(records.cart().len(), 1);
        assert!(records.custom_program().is_none());
    }

    #[test]
    fn test_corrupted_slot_reads_empty_and_is_replaced_on_write() {
        let mut backing = MemoryStore::new();
        backing
            .save_raw(Scope::Durable, "cartItems", "[{\"name\":".to_string())
            .unwrap();
        backing
            .save_raw(Scope::Session, "customProgram", "42".to_string())
            .unwrap();
        let mut records = RecordStore::new(backing);

        assert!(records.cart().is_empty());
        assert!(records.custom_program().is_none());

        records.add_to_cart("Jump Rope", Price::from_cents(800)).unwrap();
        assert_eq!(records.cart().len(), 1);
    }

    #[test]
    fn test_works_over_borrowed_store() {
        let mut backing = MemoryStore::new();
        {
            let mut records = RecordStore::new(&mut backing);
            records.add_to_cart("Yoga Mat", Price::from_cents(2000)).unwrap();
        }
        assert!(backing.load_raw(Scope::Durable, "cartItems").is_some());
    }
}
