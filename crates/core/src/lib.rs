//! Stride Core - Persistent-state-to-view synchronization.
//!
//! This crate holds everything the storefront's interactive features share:
//! - the record types persisted per visitor (cart, subscribers, feedback,
//!   custom program)
//! - the persistence adapter over durable and session scopes
//! - the record store with append / upsert / singleton semantics
//! - pure view renderers producing HTML fragment trees
//! - the interaction driver tying validation, mutation and rendering together
//!
//! # Architecture
//!
//! The core crate does no I/O. Storage backends plug in through
//! [`persistence::SlotStore`]; the storefront binary supplies Postgres and
//! session-cookie backed implementations, tests use [`persistence::MemoryStore`].
//!
//! # Modules
//!
//! - [`types`] - Record types and the [`Price`] newtype
//! - [`persistence`] - Scopes, slot keys, the `SlotStore` trait and JSON adapter
//! - [`records`] - Typed collection accessors
//! - [`view`] - Fragment tree and per-collection renderers
//! - [`interaction`] - Validate → mutate → render driver and feature rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod interaction;
pub mod persistence;
pub mod records;
pub mod types;
pub mod view;

pub use persistence::{MemoryStore, PersistenceError, Scope, SlotKey, SlotStore};
pub use records::RecordStore;
pub use types::*;
