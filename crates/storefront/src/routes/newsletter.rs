//! Newsletter subscription route handlers.
//!
//! Sign-ups are appended to the visitor's durable `subscribers` slot. Nothing
//! is sent anywhere; the status line is the only confirmation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use chrono::Utc;
use stride_core::interaction::{ContainerId, Subscribe, SubscribeInput};
use tower_sessions::Session;
use tracing::instrument;

use super::{PatchView, StatusView, form_status, outcome_patches};
use crate::models::VisitorId;
use crate::state::AppState;

/// Newsletter form state.
#[derive(Debug, Clone, Default)]
pub struct SubscribeFormView {
    pub email: String,
    pub status: Option<StatusView>,
}

/// Form fragment returned after a submission (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/subscribe_response.html")]
pub struct SubscribeResponseTemplate {
    pub subscribe: SubscribeFormView,
    pub patches: Vec<PatchView>,
}

/// Subscribe to the newsletter (HTMX).
#[instrument(skip(state, session, form))]
pub async fn subscribe(
    State(state): State<AppState>,
    session: Session,
    visitor: VisitorId,
    Form(form): Form<SubscribeInput>,
) -> SubscribeResponseTemplate {
    let outcome = state
        .storage()
        .submit::<Subscribe>(visitor, &session, &form, Utc::now())
        .await;

    let email = if outcome.reset_form {
        String::new()
    } else {
        form.email
    };

    SubscribeResponseTemplate {
        subscribe: SubscribeFormView {
            email,
            status: form_status(&outcome, ContainerId::SubscribeMessage),
        },
        patches: outcome_patches(&outcome),
    }
}
