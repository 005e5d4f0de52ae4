//! Interaction driver: validate → mutate → render.
//!
//! Every storefront feature follows the same cycle. [`submit`] runs it for any
//! [`Interaction`] implementation:
//!
//! 1. validate the raw input into a record, or reject it
//! 2. on rejection, report an error status (or drop silently) and write nothing
//! 3. otherwise apply exactly one record store mutation
//! 4. re-render the affected views from the store
//! 5. ask the caller to reset the form
//!
//! The driver only describes what to show; writing [`ViewPatch`]es into the
//! page's container nodes is left to the caller.

pub mod features;

use core::fmt;

use chrono::{DateTime, Utc};

use crate::persistence::{PersistenceError, SlotStore};
use crate::records::RecordStore;
use crate::types::{CartLineItem, CustomProgram, FeedbackEntry};
use crate::view::{self, Fragment};

pub use features::{
    AddToCart, AddToCartInput, CartAddition, Contact, ContactInput, ContactRequest, Feedback,
    FeedbackInput, ProgramInput, ProgramPlanner, Subscribe, SubscribeInput,
};

/// Status text shown when a validated submission could not be stored.
pub const WRITE_FAILED_TEXT: &str = "Something went wrong. Please try again.";

/// Page elements the core writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerId {
    CartItems,
    CartTotal,
    CartNotice,
    FeedbackList,
    FeedbackMessage,
    ProgramSummary,
    SubscribeMessage,
    ContactMessageStatus,
    CustomProgramMessage,
}

impl ContainerId {
    /// The element id in the page.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CartItems => "cartItemsContainer",
            Self::CartTotal => "cartTotal",
            Self::CartNotice => "cartNotice",
            Self::FeedbackList => "feedbackList",
            Self::FeedbackMessage => "feedbackMessage",
            Self::ProgramSummary => "programSummary",
            Self::SubscribeMessage => "subscribeMessage",
            Self::ContactMessageStatus => "contactMessageStatus",
            Self::CustomProgramMessage => "customProgramMessage",
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success or error styling for a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

impl StatusKind {
    /// Text color for the message.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Success => "green",
            Self::Error => "red",
        }
    }
}

/// A status message written into a form's message element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub target: ContainerId,
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    #[must_use]
    pub fn success(target: ContainerId, text: impl Into<String>) -> Self {
        Self {
            target,
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(target: ContainerId, text: impl Into<String>) -> Self {
        Self {
            target,
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Replacement content for one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchBody {
    /// Replaces the container's children.
    Markup(Fragment),
    /// Replaces the container's text content.
    Text(String),
}

/// New content for one container node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPatch {
    pub target: ContainerId,
    pub body: PatchBody,
}

impl ViewPatch {
    /// The patch body as HTML, escaping plain text bodies.
    #[must_use]
    pub fn html(&self) -> String {
        match &self.body {
            PatchBody::Markup(fragment) => fragment.to_html(),
            PatchBody::Text(text) => Fragment::from_iter([view::Node::Text(text.clone())]).to_html(),
        }
    }
}

/// Patches for the cart items container and the total line.
#[must_use]
pub fn cart_patches(items: &[CartLineItem]) -> Vec<ViewPatch> {
    let view = view::render_cart(items);
    vec![
        ViewPatch {
            target: ContainerId::CartItems,
            body: PatchBody::Markup(view.items),
        },
        ViewPatch {
            target: ContainerId::CartTotal,
            body: PatchBody::Text(view.total),
        },
    ]
}

/// Patch for the feedback list.
#[must_use]
pub fn feedback_patches(entries: &[FeedbackEntry]) -> Vec<ViewPatch> {
    vec![ViewPatch {
        target: ContainerId::FeedbackList,
        body: PatchBody::Markup(view::render_feedback(entries)),
    }]
}

/// Patch for the program summary; empty when no program is stored.
#[must_use]
pub fn program_patches(program: Option<&CustomProgram>) -> Vec<ViewPatch> {
    if program.is_none() {
        return Vec::new();
    }
    vec![ViewPatch {
        target: ContainerId::ProgramSummary,
        body: PatchBody::Markup(view::render_program(program)),
    }]
}

/// Every view, rendered from the current store, as on page load.
#[must_use]
pub fn render_all<S: SlotStore>(records: &RecordStore<S>) -> Vec<ViewPatch> {
    let mut patches = cart_patches(&records.cart());
    patches.extend(feedback_patches(&records.feedback()));
    patches.extend(program_patches(records.custom_program().as_ref()));
    patches
}

// =============================================================================
// Rejections
// =============================================================================

/// A required field was missing. The message is shown to the visitor as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address.")]
    MissingSubscriberEmail,
    #[error("Please provide your name and email.")]
    MissingContactDetails,
    #[error("Please provide your name for feedback.")]
    MissingFeedbackName,
}

/// Malformed add-to-cart input, dropped without telling the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IgnoredInput {
    #[error("product name is missing")]
    MissingName,
    #[error("price is missing, unparseable or not positive")]
    NonPositivePrice,
}

/// Why a submission did not reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Shown to the visitor as an error status.
    Invalid(ValidationError),
    /// Dropped silently.
    Ignored(IgnoredInput),
}

impl From<ValidationError> for Rejection {
    fn from(error: ValidationError) -> Self {
        Self::Invalid(error)
    }
}

impl From<IgnoredInput> for Rejection {
    fn from(reason: IgnoredInput) -> Self {
        Self::Ignored(reason)
    }
}

// =============================================================================
// Driver
// =============================================================================

/// What a successful submission tells the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Confirmation {
    /// Success text for the feature's status element.
    pub status: Option<&'static str>,
    /// A one-off notice (e.g. "added to cart").
    pub notice: Option<String>,
}

/// One feature's validation, mutation and render rules.
pub trait Interaction {
    /// Raw form or control input.
    type Input;
    /// The validated record handed to the store.
    type Record;

    /// Name used in logs.
    const NAME: &'static str;
    /// Element receiving status messages, if the feature has one.
    const STATUS_TARGET: Option<ContainerId>;
    /// Whether the form is cleared after a successful submission.
    const RESETS_FORM: bool = true;

    /// Check required fields and build the record.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when required input is missing.
    fn validate(input: &Self::Input, now: DateTime<Utc>) -> Result<Self::Record, Rejection>;

    /// What to tell the visitor once the record is stored.
    fn confirm(record: &Self::Record) -> Confirmation;

    /// Perform the feature's single store mutation.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the store write fails.
    fn apply<S: SlotStore>(
        records: &mut RecordStore<S>,
        record: Self::Record,
    ) -> Result<(), PersistenceError>;

    /// Views to refresh after a successful mutation.
    fn render<S: SlotStore>(_records: &RecordStore<S>) -> Vec<ViewPatch> {
        Vec::new()
    }
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Stored and re-rendered.
    Applied,
    /// Failed validation; an error status was produced.
    Rejected,
    /// Dropped silently.
    Ignored,
    /// Validated but the store write failed.
    Failed,
}

/// Everything the caller needs to update the page after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub disposition: Disposition,
    pub status: Option<StatusMessage>,
    pub notice: Option<String>,
    pub patches: Vec<ViewPatch>,
    pub reset_form: bool,
}

impl Outcome {
    fn unchanged(disposition: Disposition, status: Option<StatusMessage>) -> Self {
        Self {
            disposition,
            status,
            notice: None,
            patches: Vec::new(),
            reset_form: false,
        }
    }

    /// A submission whose write did not reach storage.
    ///
    /// Used both when the store refuses a write and when a caller fails to
    /// flush an applied submission to its backend.
    #[must_use]
    pub fn write_failed(status_target: Option<ContainerId>) -> Self {
        let status = status_target.map(|target| StatusMessage::error(target, WRITE_FAILED_TEXT));
        Self::unchanged(Disposition::Failed, status)
    }

    /// Whether the store was mutated.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.disposition == Disposition::Applied
    }
}

/// Run one submission of interaction `I` against `records`.
///
/// Rejected, ignored and failed submissions leave the store untouched.
pub fn submit<I, S>(records: &mut RecordStore<S>, input: &I::Input, now: DateTime<Utc>) -> Outcome
where
    I: Interaction,
    S: SlotStore,
{
    let record = match I::validate(input, now) {
        Ok(record) => record,
        Err(Rejection::Invalid(error)) => {
            tracing::info!(interaction = I::NAME, %error, "Submission rejected");
            let status = I::STATUS_TARGET.map(|target| StatusMessage::error(target, error.to_string()));
            return Outcome::unchanged(Disposition::Rejected, status);
        }
        Err(Rejection::Ignored(reason)) => {
            tracing::debug!(interaction = I::NAME, %reason, "Submission ignored");
            return Outcome::unchanged(Disposition::Ignored, None);
        }
    };

    let confirmation = I::confirm(&record);

    if let Err(error) = I::apply(records, record) {
        tracing::error!(interaction = I::NAME, %error, "Failed to persist submission");
        return Outcome::write_failed(I::STATUS_TARGET);
    }

    tracing::info!(interaction = I::NAME, "Submission applied");

    Outcome {
        disposition: Disposition::Applied,
        status: confirmation
            .status
            .zip(I::STATUS_TARGET)
            .map(|(text, target)| StatusMessage::success(target, text)),
        notice: confirmation.notice,
        patches: I::render(records),
        reset_form: I::RESETS_FORM,
    }
}
