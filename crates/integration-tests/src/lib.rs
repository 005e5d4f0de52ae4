//! Integration tests for Stride.
//!
//! Each test spawns the full storefront router on an ephemeral port with the
//! in-memory durable and session backends, then drives it over HTTP the way
//! the browser's HTMX requests would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stride-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart` - Add to cart, cart containers, `cart-updated` trigger
//! - `forms` - Newsletter, contact, feedback and program forms
//! - `scopes` - Durable vs session slot lifetimes
//! - `health` - Liveness and readiness

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use reqwest::cookie::Jar;
use reqwest::header::SET_COOKIE;
use stride_storefront::config::StorefrontConfig;
use stride_storefront::middleware::visitor::VISITOR_COOKIE_NAME;
use stride_storefront::services::DurableStore;
use stride_storefront::state::AppState;
use tokio::task::JoinHandle;
use tower_sessions::MemoryStore;
use url::Url;

/// A storefront running on `127.0.0.1` with in-memory backends.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let config = StorefrontConfig {
            database_url: None,
            host: addr.ip(),
            port: addr.port(),
            base_url: Url::parse(&format!("http://{addr}")).expect("Invalid base URL"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config, DurableStore::memory());
        let router = stride_storefront::app(state, MemoryStore::default());

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        Self { addr, handle }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A browser-like client that keeps every cookie it is given.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// A client that only carries the durable visitor cookie, as a browser
    /// does after it is closed and reopened.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn reopened_client(&self, visitor_id: &str) -> Client {
        let jar = Jar::default();
        let url = Url::parse(&self.url("/")).expect("Invalid server URL");
        jar.add_cookie_str(&format!("{VISITOR_COOKIE_NAME}={visitor_id}; Path=/"), &url);

        Client::builder()
            .cookie_provider(Arc::new(jar))
            .build()
            .expect("Failed to create HTTP client")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The visitor id set by a response, if it issued one.
#[must_use]
pub fn issued_visitor_id(response: &reqwest::Response) -> Option<String> {
    let prefix = format!("{VISITOR_COOKIE_NAME}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            cookie
                .strip_prefix(&prefix)
                .and_then(|rest| rest.split(';').next())
                .map(str::to_string)
        })
}
