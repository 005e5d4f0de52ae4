//! Contact form route handler.
//!
//! Contact requests are acknowledged but not stored or forwarded.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use chrono::Utc;
use stride_core::interaction::{Contact, ContactInput, ContainerId};
use tower_sessions::Session;
use tracing::instrument;

use super::{PatchView, StatusView, form_status, outcome_patches};
use crate::models::VisitorId;
use crate::state::AppState;

/// Contact form state.
#[derive(Debug, Clone, Default)]
pub struct ContactFormView {
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: Option<StatusView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/contact_response.html")]
pub struct ContactResponseTemplate {
    pub contact: ContactFormView,
    pub patches: Vec<PatchView>,
}

/// Submit the contact form (HTMX).
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    visitor: VisitorId,
    Form(form): Form<ContactInput>,
) -> ContactResponseTemplate {
    let outcome = state
        .storage()
        .submit::<Contact>(visitor, &session, &form, Utc::now())
        .await;

    let status = form_status(&outcome, ContainerId::ContactMessageStatus);
    let contact = if outcome.reset_form {
        ContactFormView {
            status,
            ..ContactFormView::default()
        }
    } else {
        ContactFormView {
            name: form.name,
            email: form.email,
            message: form.message,
            status,
        }
    };

    ContactResponseTemplate {
        contact,
        patches: outcome_patches(&outcome),
    }
}
