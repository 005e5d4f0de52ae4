//! Domain models for storefront.

pub mod visitor;

pub use visitor::VisitorId;
