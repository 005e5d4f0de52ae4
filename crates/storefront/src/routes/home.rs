//! Home page route handler.
//!
//! The page is rendered entirely from the visitor's stored records, so a
//! reload shows the same cart, feedback list and program summary as before.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use stride_core::{Price, view};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::CartContents;
use super::contact::ContactFormView;
use super::feedback::FeedbackFormView;
use super::newsletter::SubscribeFormView;
use super::program::ProgramFormView;
use crate::error::Result;
use crate::models::VisitorId;
use crate::state::AppState;

// =============================================================================
// Catalog (static content)
// =============================================================================

/// A product offered on the home page.
#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub name: &'static str,
    pub blurb: &'static str,
    pub price_cents: i64,
}

/// Products shown in the shop section, in display order.
pub const CATALOG: [Product; 6] = [
    Product {
        name: "Yoga Mat",
        blurb: "Non-slip 6mm mat for studio and home practice.",
        price_cents: 2000,
    },
    Product {
        name: "Water Bottle",
        blurb: "Insulated 750ml bottle that keeps water cold all session.",
        price_cents: 550,
    },
    Product {
        name: "Resistance Bands",
        blurb: "Set of five bands from light to extra heavy.",
        price_cents: 1500,
    },
    Product {
        name: "Foam Roller",
        blurb: "High-density roller for recovery days.",
        price_cents: 2499,
    },
    Product {
        name: "Jump Rope",
        blurb: "Adjustable speed rope with ball-bearing handles.",
        price_cents: 800,
    },
    Product {
        name: "Kettlebell",
        blurb: "12kg cast iron kettlebell with a wide handle.",
        price_cents: 4500,
    },
];

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub name: &'static str,
    pub blurb: &'static str,
    /// Display price, e.g. `$20.00`.
    pub price_label: String,
    /// Value of the control's `data-price` attribute, e.g. `20.00`.
    pub price_attr: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let price = Price::from_cents(product.price_cents);
        Self {
            name: product.name,
            blurb: product.blurb,
            price_label: price.to_string(),
            price_attr: format!("{:.2}", price.rounded()),
        }
    }
}

// =============================================================================
// Page
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductView>,
    pub item_count: u32,
    pub cart_items_html: String,
    pub cart_total: String,
    pub feedback_html: String,
    pub program_html: String,
    pub subscribe: SubscribeFormView,
    pub contact: ContactFormView,
    pub feedback: FeedbackFormView,
    pub program: ProgramFormView,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    visitor: VisitorId,
) -> Result<HomeTemplate> {
    let (cart, feedback_html, program_html) = state
        .storage()
        .read(visitor, &session, |records| {
            (
                CartContents::from_records(records),
                view::render_feedback(&records.feedback()).to_html(),
                view::render_program(records.custom_program().as_ref()).to_html(),
            )
        })
        .await?;

    Ok(HomeTemplate {
        products: CATALOG.iter().map(ProductView::from).collect(),
        item_count: cart.item_count,
        cart_items_html: cart.items_html,
        cart_total: cart.total,
        feedback_html,
        program_html,
        subscribe: SubscribeFormView::default(),
        contact: ContactFormView::default(),
        feedback: FeedbackFormView::default(),
        program: ProgramFormView::default(),
    })
}
