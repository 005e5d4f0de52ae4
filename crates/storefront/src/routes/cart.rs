//! Cart route handlers.
//!
//! The cart lives in the visitor's durable `cartItems` slot. Add-to-cart
//! controls post their product name and price; a valid add swaps the cart
//! containers and notice out of band and fires `cart-updated` with the new
//! item count.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use chrono::Utc;
use stride_core::interaction::{
    AddToCart, AddToCartInput, ContainerId, Disposition, PatchBody, ViewPatch, WRITE_FAILED_TEXT,
};
use stride_core::{RecordStore, cart_item_count, view};
use tower_sessions::Session;
use tracing::instrument;

use super::{PatchView, outcome_patches};
use crate::error::{Result, add_breadcrumb};
use crate::models::VisitorId;
use crate::services::SlotSnapshot;
use crate::state::AppState;

/// HTMX event fired after the cart changes.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Rendered cart containers.
#[derive(Debug, Clone)]
pub struct CartContents {
    pub items_html: String,
    pub total: String,
    pub item_count: u32,
}

impl CartContents {
    /// Render the cart held in a record store.
    #[must_use]
    pub fn from_records(records: &RecordStore<SlotSnapshot>) -> Self {
        let items = records.cart();
        let view = view::render_cart(&items);
        Self {
            items_html: view.items.to_html(),
            total: view.total,
            item_count: cart_item_count(&items),
        }
    }
}

/// Cart containers fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart.html")]
pub struct CartTemplate {
    pub cart_items_html: String,
    pub cart_total: String,
}

/// Out-of-band patches fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/patches.html")]
pub struct PatchesTemplate {
    pub patches: Vec<PatchView>,
}

/// `HX-Trigger` value announcing the new item count.
fn cart_updated_trigger(item_count: u32) -> String {
    let mut events = serde_json::Map::new();
    events.insert(
        CART_UPDATED_EVENT.to_owned(),
        serde_json::json!({ "itemCount": item_count }),
    );
    serde_json::Value::Object(events).to_string()
}

/// Display the cart containers.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    visitor: VisitorId,
) -> Result<CartTemplate> {
    let cart = state
        .storage()
        .read(visitor, &session, CartContents::from_records)
        .await?;

    Ok(CartTemplate {
        cart_items_html: cart.items_html,
        cart_total: cart.total,
    })
}

/// Add one unit of a product to the cart (HTMX).
///
/// Invalid input (no name, or a price that is not positive) is ignored with
/// `204 No Content`.
#[instrument(skip(state, session, form), fields(product = form.name.as_deref().unwrap_or_default()))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    visitor: VisitorId,
    Form(form): Form<AddToCartInput>,
) -> Response {
    let (outcome, item_count) = state
        .storage()
        .submit_then::<AddToCart, _>(visitor, &session, &form, Utc::now(), |records| {
            cart_item_count(&records.cart())
        })
        .await;

    match outcome.disposition {
        Disposition::Applied => {}
        Disposition::Ignored | Disposition::Rejected => {
            return StatusCode::NO_CONTENT.into_response();
        }
        Disposition::Failed => {
            let notice = ViewPatch {
                target: ContainerId::CartNotice,
                body: PatchBody::Text(WRITE_FAILED_TEXT.to_string()),
            };
            return PatchesTemplate {
                patches: vec![PatchView::from(&notice)],
            }
            .into_response();
        }
    }

    if let Some(name) = form.name.as_deref() {
        add_breadcrumb("cart", "Added to cart", Some(&[("product", name)]));
    }

    let item_count = item_count.unwrap_or_default();

    (
        AppendHeaders([("HX-Trigger", cart_updated_trigger(item_count))]),
        PatchesTemplate {
            patches: outcome_patches(&outcome),
        },
    )
        .into_response()
}
