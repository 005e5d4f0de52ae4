//! Feedback board route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use chrono::Utc;
use stride_core::interaction::{ContainerId, Feedback, FeedbackInput};
use tower_sessions::Session;
use tracing::instrument;

use super::{PatchView, SelectOption, StatusView, form_status, outcome_patches, select_options};
use crate::models::VisitorId;
use crate::state::AppState;

/// Rating choices, best first.
pub const RATINGS: [&str; 5] = ["5", "4", "3", "2", "1"];

const DEFAULT_RATING: &str = "5";

/// Feedback form state.
#[derive(Debug, Clone)]
pub struct FeedbackFormView {
    pub name: String,
    pub comments: String,
    pub ratings: Vec<SelectOption>,
    pub status: Option<StatusView>,
}

impl Default for FeedbackFormView {
    fn default() -> Self {
        Self {
            name: String::new(),
            comments: String::new(),
            ratings: select_options(&RATINGS, DEFAULT_RATING, DEFAULT_RATING),
            status: None,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/feedback_response.html")]
pub struct FeedbackResponseTemplate {
    pub feedback: FeedbackFormView,
    pub patches: Vec<PatchView>,
}

/// Submit a feedback card (HTMX).
///
/// On success the feedback list is swapped out of band with every stored card.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    visitor: VisitorId,
    Form(form): Form<FeedbackInput>,
) -> FeedbackResponseTemplate {
    let outcome = state
        .storage()
        .submit::<Feedback>(visitor, &session, &form, Utc::now())
        .await;

    let status = form_status(&outcome, ContainerId::FeedbackMessage);
    let feedback = if outcome.reset_form {
        FeedbackFormView {
            status,
            ..FeedbackFormView::default()
        }
    } else {
        FeedbackFormView {
            ratings: select_options(&RATINGS, &form.rating, DEFAULT_RATING),
            name: form.name,
            comments: form.comments,
            status,
        }
    };

    FeedbackResponseTemplate {
        feedback,
        patches: outcome_patches(&outcome),
    }
}
