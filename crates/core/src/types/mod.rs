//! Record types for Stride.
//!
//! Each type here is persisted as JSON in one named slot. Field names on the
//! wire are fixed by `serde` attributes and must stay stable across releases,
//! since visitors keep durable slots indefinitely.

pub mod cart;
pub mod feedback;
pub mod price;
pub mod program;
pub mod subscriber;

pub use cart::{CartLineItem, cart_item_count, cart_total};
pub use feedback::FeedbackEntry;
pub use price::Price;
pub use program::CustomProgram;
pub use subscriber::Subscriber;
