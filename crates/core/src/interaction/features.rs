//! Per-feature validation, mutation and render rules.
//!
//! | Feature | Required input | Mutation | Views refreshed |
//! |---|---|---|---|
//! | [`AddToCart`] | name, price > 0 (else ignored) | cart upsert | cart |
//! | [`Subscribe`] | email | subscriber append | - |
//! | [`Contact`] | name, email | none | - |
//! | [`Feedback`] | name | feedback append | feedback list |
//! | [`ProgramPlanner`] | - | program overwrite | program summary |

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{
    Confirmation, ContainerId, IgnoredInput, Interaction, Rejection, ValidationError, ViewPatch,
    cart_patches, feedback_patches, program_patches,
};
use crate::persistence::{PersistenceError, SlotStore};
use crate::records::RecordStore;
use crate::types::program::DEFAULT_DAYS_PER_WEEK;
use crate::types::{CustomProgram, FeedbackEntry, Price, Subscriber};

/// Returns the trimmed value, or `None` when nothing is left.
fn required(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// =============================================================================
// Add to cart
// =============================================================================

/// Attributes read from an add-to-cart control.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddToCartInput {
    /// The control's `data-name`.
    pub name: Option<String>,
    /// The control's `data-price`, as text.
    pub price: Option<String>,
}

/// A validated add-to-cart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartAddition {
    pub name: String,
    pub price: Price,
}

/// Add one unit of a product to the cart.
///
/// A missing name or a price that is missing, unparseable, zero or negative
/// drops the action silently: no write, no message.
pub struct AddToCart;

impl Interaction for AddToCart {
    type Input = AddToCartInput;
    type Record = CartAddition;

    const NAME: &'static str = "add_to_cart";
    const STATUS_TARGET: Option<ContainerId> = None;
    const RESETS_FORM: bool = false;

    fn validate(input: &Self::Input, _now: DateTime<Utc>) -> Result<Self::Record, Rejection> {
        let name = input
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(IgnoredInput::MissingName)?;

        let price = input
            .price
            .as_deref()
            .map_or(Price::ZERO, Price::parse_lenient);
        if !price.is_positive() {
            return Err(IgnoredInput::NonPositivePrice.into());
        }

        Ok(CartAddition {
            name: name.to_owned(),
            price,
        })
    }

    fn confirm(record: &Self::Record) -> Confirmation {
        Confirmation {
            status: None,
            notice: Some(format!("{} has been added to your cart.", record.name)),
        }
    }

    fn apply<S: SlotStore>(
        records: &mut RecordStore<S>,
        record: Self::Record,
    ) -> Result<(), PersistenceError> {
        records.add_to_cart(&record.name, record.price).map(drop)
    }

    fn render<S: SlotStore>(records: &RecordStore<S>) -> Vec<ViewPatch> {
        cart_patches(&records.cart())
    }
}

// =============================================================================
// Newsletter
// =============================================================================

/// Newsletter form fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscribeInput {
    pub email: String,
}

/// Record a newsletter sign-up.
pub struct Subscribe;

impl Interaction for Subscribe {
    type Input = SubscribeInput;
    type Record = Subscriber;

    const NAME: &'static str = "subscribe";
    const STATUS_TARGET: Option<ContainerId> = Some(ContainerId::SubscribeMessage);

    fn validate(input: &Self::Input, now: DateTime<Utc>) -> Result<Self::Record, Rejection> {
        let email = required(&input.email).ok_or(ValidationError::MissingSubscriberEmail)?;
        Ok(Subscriber {
            email: email.to_owned(),
            subscribed_at: now,
        })
    }

    fn confirm(_record: &Self::Record) -> Confirmation {
        Confirmation {
            status: Some("Thanks for subscribing! Check your inbox for updates."),
            notice: None,
        }
    }

    fn apply<S: SlotStore>(
        records: &mut RecordStore<S>,
        record: Self::Record,
    ) -> Result<(), PersistenceError> {
        records.add_subscriber(record)
    }
}

// =============================================================================
// Contact
// =============================================================================

/// Contact form fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// A validated contact request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Acknowledge a contact request.
///
/// Nothing is stored; the only effect is the status message.
pub struct Contact;

impl Interaction for Contact {
    type Input = ContactInput;
    type Record = ContactRequest;

    const NAME: &'static str = "contact";
    const STATUS_TARGET: Option<ContainerId> = Some(ContainerId::ContactMessageStatus);

    fn validate(input: &Self::Input, _now: DateTime<Utc>) -> Result<Self::Record, Rejection> {
        let (Some(name), Some(email)) = (required(&input.name), required(&input.email)) else {
            return Err(ValidationError::MissingContactDetails.into());
        };
        Ok(ContactRequest {
            name: name.to_owned(),
            email: email.to_owned(),
            message: input.message.trim().to_owned(),
        })
    }

    fn confirm(_record: &Self::Record) -> Confirmation {
        Confirmation {
            status: Some("Thank you for contacting us! We will follow up soon."),
            notice: None,
        }
    }

    fn apply<S: SlotStore>(
        _records: &mut RecordStore<S>,
        _record: Self::Record,
    ) -> Result<(), PersistenceError> {
        Ok(())
    }
}

// =============================================================================
// Feedback
// =============================================================================

/// Feedback form fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackInput {
    pub name: String,
    pub rating: String,
    pub comments: String,
}

/// Append a feedback card.
///
/// Only the name is required; the rating is stored exactly as submitted.
pub struct Feedback;

impl Interaction for Feedback {
    type Input = FeedbackInput;
    type Record = FeedbackEntry;

    const NAME: &'static str = "feedback";
    const STATUS_TARGET: Option<ContainerId> = Some(ContainerId::FeedbackMessage);

    fn validate(input: &Self::Input, now: DateTime<Utc>) -> Result<Self::Record, Rejection> {
        let name = required(&input.name).ok_or(ValidationError::MissingFeedbackName)?;
        Ok(FeedbackEntry {
            name: name.to_owned(),
            rating: input.rating.clone(),
            comments: input.comments.trim().to_owned(),
            submitted_at: now,
        })
    }

    fn confirm(_record: &Self::Record) -> Confirmation {
        Confirmation::default()
    }

    fn apply<S: SlotStore>(
        records: &mut RecordStore<S>,
        record: Self::Record,
    ) -> Result<(), PersistenceError> {
        records.add_feedback(record)
    }

    fn render<S: SlotStore>(records: &RecordStore<S>) -> Vec<ViewPatch> {
        feedback_patches(&records.feedback())
    }
}

// =============================================================================
// Custom program
// =============================================================================

/// Custom program form fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgramInput {
    pub goal: String,
    pub days_per_week: String,
    pub intensity: String,
    pub preferences: String,
}

/// Save this session's custom program, replacing any earlier one.
pub struct ProgramPlanner;

impl Interaction for ProgramPlanner {
    type Input = ProgramInput;
    type Record = CustomProgram;

    const NAME: &'static str = "custom_program";
    const STATUS_TARGET: Option<ContainerId> = Some(ContainerId::CustomProgramMessage);

    fn validate(input: &Self::Input, _now: DateTime<Utc>) -> Result<Self::Record, Rejection> {
        let days_per_week = if input.days_per_week.is_empty() {
            DEFAULT_DAYS_PER_WEEK.to_owned()
        } else {
            input.days_per_week.clone()
        };

        Ok(CustomProgram {
            goal: input.goal.clone(),
            days_per_week,
            intensity: input.intensity.clone(),
            preferences: input.preferences.trim().to_owned(),
        })
    }

    fn confirm(_record: &Self::Record) -> Confirmation {
        Confirmation {
            status: Some("Your custom program has been generated and saved for this session."),
            notice: None,
        }
    }

    fn apply<S: SlotStore>(
        records: &mut RecordStore<S>,
        record: Self::Record,
    ) -> Result<(), PersistenceError> {
        records.save_custom_program(&record)
    }

    fn render<S: SlotStore>(records: &RecordStore<S>) -> Vec<ViewPatch> {
        program_patches(records.custom_program().as_ref())
    }
}
