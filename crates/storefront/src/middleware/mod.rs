//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, session-scope slots)
//! 5. Visitor cookie (durable-scope identity)

pub mod request_id;
pub mod session;
pub mod visitor;

pub use request_id::request_id_middleware;
pub use session::create_session_layer;
pub use visitor::visitor_middleware;
