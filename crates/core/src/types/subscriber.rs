//! Newsletter subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A newsletter sign-up.
///
/// Subscribers are append-only; the same email may appear more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    #[serde(rename = "date")]
    pub subscribed_at: DateTime<Utc>,
}
