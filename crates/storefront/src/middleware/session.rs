//! Session middleware configuration.
//!
//! The session holds session-scope slots only. Its cookie carries no max-age,
//! so the browser drops it (and with it the custom program) when the browsing
//! session ends.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "fs_session";

/// Create the session layer over any session store.
///
/// Production passes `tower_sessions_sqlx_store::PostgresStore`; the
/// in-memory mode and tests pass `tower_sessions::MemoryStore`.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StorefrontConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
