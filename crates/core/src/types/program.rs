//! Custom training program selections.

use serde::{Deserialize, Serialize};

/// Days per week used when the form leaves the field blank.
pub const DEFAULT_DAYS_PER_WEEK: &str = "3";

fn default_days_per_week() -> String {
    DEFAULT_DAYS_PER_WEEK.to_owned()
}

/// The visitor's configured program for the current session.
///
/// Stored as a singleton in session scope and replaced wholesale on every
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProgram {
    pub goal: String,
    #[serde(default = "default_days_per_week")]
    pub days_per_week: String,
    pub intensity: String,
    /// Optional notes, empty when none were given.
    #[serde(default)]
    pub preferences: String,
}
