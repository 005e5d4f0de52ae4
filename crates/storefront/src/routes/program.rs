//! Custom program route handler.
//!
//! The program lives in the session scope, so it is gone once the browser
//! session ends.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use chrono::Utc;
use stride_core::interaction::{ContainerId, ProgramInput, ProgramPlanner};
use tower_sessions::Session;
use tracing::instrument;

use super::{PatchView, SelectOption, StatusView, form_status, outcome_patches, select_options};
use crate::models::VisitorId;
use crate::state::AppState;

pub const GOALS: [&str; 4] = ["Weight Loss", "Strength", "Endurance", "Flexibility"];
pub const INTENSITIES: [&str; 3] = ["Low", "Moderate", "High"];

const DEFAULT_GOAL: &str = "Strength";
const DEFAULT_INTENSITY: &str = "Moderate";

/// Custom program form state.
#[derive(Debug, Clone)]
pub struct ProgramFormView {
    pub goals: Vec<SelectOption>,
    pub days_per_week: String,
    pub intensities: Vec<SelectOption>,
    pub preferences: String,
    pub status: Option<StatusView>,
}

impl Default for ProgramFormView {
    fn default() -> Self {
        Self {
            goals: select_options(&GOALS, DEFAULT_GOAL, DEFAULT_GOAL),
            days_per_week: String::new(),
            intensities: select_options(&INTENSITIES, DEFAULT_INTENSITY, DEFAULT_INTENSITY),
            preferences: String::new(),
            status: None,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/program_response.html")]
pub struct ProgramResponseTemplate {
    pub program: ProgramFormView,
    pub patches: Vec<PatchView>,
}

/// Generate and save this session's custom program (HTMX).
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    visitor: VisitorId,
    Form(form): Form<ProgramInput>,
) -> ProgramResponseTemplate {
    let outcome = state
        .storage()
        .submit::<ProgramPlanner>(visitor, &session, &form, Utc::now())
        .await;

    let status = form_status(&outcome, ContainerId::CustomProgramMessage);
    let program = if outcome.reset_form {
        ProgramFormView {
            status,
            ..ProgramFormView::default()
        }
    } else {
        ProgramFormView {
            goals: select_options(&GOALS, &form.goal, DEFAULT_GOAL),
            days_per_week: form.days_per_week,
            intensities: select_options(&INTENSITIES, &form.intensity, DEFAULT_INTENSITY),
            preferences: form.preferences,
            status,
        }
    };

    ProgramResponseTemplate {
        program,
        patches: outcome_patches(&outcome),
    }
}
