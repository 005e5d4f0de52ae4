//! Visitor record commands.
//!
//! Reads durable slots straight from `storefront.visitor_slot` and decodes
//! them with the same record store the server uses, so corrupted slots show
//! up exactly as a visitor would see them (empty).

use stride_core::{MemoryStore, RecordStore, Scope, SlotKey, SlotStore, cart_total};
use stride_storefront::db::{self, SlotRepository};
use stride_storefront::models::VisitorId;
use uuid::Uuid;

use super::migrate::database_url;

/// Print a visitor's durable records.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the query fails.
pub async fn show(visitor: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&database_url()?).await?;
    let visitor = VisitorId::from_uuid(visitor);

    let rows = SlotRepository::new(&pool).load_all(visitor).await?;
    if rows.is_empty() {
        tracing::info!(%visitor, "No records stored for visitor");
        return Ok(());
    }

    let mut store = MemoryStore::new();
    for row in rows {
        match SlotKey::from_key(&row.slot_key) {
            Some(slot) if slot.scope() == Scope::Durable => {
                tracing::info!(slot = %slot, updated_at = %row.updated_at, "Slot");
                store.save_raw(Scope::Durable, slot.as_str(), row.value)?;
            }
            _ => tracing::warn!(key = %row.slot_key, "Skipping unknown slot"),
        }
    }
    let records = RecordStore::new(store);

    let cart = records.cart();
    tracing::info!(lines = cart.len(), total = %cart_total(&cart), "Cart");
    for item in &cart {
        tracing::info!(
            name = %item.name,
            price = %item.price,
            quantity = item.quantity,
            line_total = %item.line_total(),
            "Cart line"
        );
    }

    let subscribers = records.subscribers();
    tracing::info!(count = subscribers.len(), "Subscribers");
    for subscriber in &subscribers {
        tracing::info!(email = %subscriber.email, date = %subscriber.subscribed_at, "Subscriber");
    }

    let feedback = records.feedback();
    tracing::info!(count = feedback.len(), "Feedback");
    for entry in &feedback {
        tracing::info!(
            name = %entry.name,
            rating = %entry.rating,
            comments = %entry.comments,
            date = %entry.submitted_at,
            "Feedback entry"
        );
    }

    Ok(())
}

/// Delete every durable slot stored for a visitor.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn clear(visitor: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&database_url()?).await?;
    let visitor = VisitorId::from_uuid(visitor);

    let removed = SlotRepository::new(&pool).clear(visitor).await?;
    tracing::info!(%visitor, removed, "Cleared visitor records");
    Ok(())
}
