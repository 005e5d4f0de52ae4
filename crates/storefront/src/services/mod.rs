//! Business logic services for storefront.
//!
//! # Services
//!
//! - `storage` - Per-visitor slot snapshots over Postgres (or memory) and the session

pub mod storage;

pub use storage::{DurableStore, SlotSnapshot, SlotStorage, StorageError};
