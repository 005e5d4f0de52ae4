//! Customer feedback entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One submitted feedback card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Reviewer name (required on submission).
    pub name: String,
    /// Rating as submitted by the select control, expected "1" to "5".
    ///
    /// Kept as text and never validated.
    pub rating: String,
    /// Free-form comments, empty when omitted.
    #[serde(default)]
    pub comments: String,
    #[serde(rename = "date")]
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_default_to_empty() {
        let entry: FeedbackEntry = serde_json::from_str(
            r#"{"name":"Ana","rating":"4","date":"2026-01-05T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(entry.comments, "");
        assert_eq!(entry.rating, "4");
    }
}
