//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (every view rendered from stored records)
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart containers (items + total)
//! POST /cart/add               - Add to cart (OOB cart patches + notice, triggers cart-updated)
//!
//! # Forms (HTMX, each returns its form plus OOB patches)
//! POST /newsletter             - Newsletter sign-up
//! POST /contact                - Contact request
//! POST /feedback               - Feedback card
//! POST /program                - Custom program
//! ```

pub mod cart;
pub mod contact;
pub mod feedback;
pub mod health;
pub mod home;
pub mod newsletter;
pub mod program;

use axum::{
    Router,
    routing::{get, post},
};
use stride_core::interaction::{ContainerId, Outcome, PatchBody, StatusMessage, ViewPatch};

use crate::state::AppState;

// =============================================================================
// Shared view models
// =============================================================================

/// An out-of-band swap into one page container.
#[derive(Debug, Clone)]
pub struct PatchView {
    pub id: &'static str,
    pub html: String,
}

impl From<&ViewPatch> for PatchView {
    fn from(patch: &ViewPatch) -> Self {
        Self {
            id: patch.target.as_str(),
            html: patch.html(),
        }
    }
}

/// A colored status line under a form.
#[derive(Debug, Clone)]
pub struct StatusView {
    pub text: String,
    pub color: &'static str,
}

impl From<&StatusMessage> for StatusView {
    fn from(status: &StatusMessage) -> Self {
        Self {
            text: status.text.clone(),
            color: status.kind.color(),
        }
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Build select options, marking `current` (or `fallback` when nothing matches).
fn select_options(choices: &[&'static str], current: &str, fallback: &str) -> Vec<SelectOption> {
    let current = if choices.contains(&current) {
        current
    } else {
        fallback
    };
    choices
        .iter()
        .map(|&value| SelectOption {
            value,
            selected: value == current,
        })
        .collect()
}

/// The status produced for a given form, if any.
fn form_status(outcome: &Outcome, target: ContainerId) -> Option<StatusView> {
    outcome
        .status
        .as_ref()
        .filter(|status| status.target == target)
        .map(StatusView::from)
}

/// Every view patch in an outcome, plus its one-off notice.
fn outcome_patches(outcome: &Outcome) -> Vec<PatchView> {
    let mut patches: Vec<PatchView> = outcome.patches.iter().map(PatchView::from).collect();
    if let Some(notice) = &outcome.notice {
        patches.push(PatchView::from(&ViewPatch {
            target: ContainerId::CartNotice,
            body: PatchBody::Text(notice.clone()),
        }));
    }
    patches
}

// =============================================================================
// Routers
// =============================================================================

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
}

/// Create the page and form routes (everything that needs a visitor).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/cart", cart_routes())
        .route("/newsletter", post(newsletter::subscribe))
        .route("/contact", post(contact::submit))
        .route("/feedback", post(feedback::submit))
        .route("/program", post(program::submit))
}

/// Create the health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
