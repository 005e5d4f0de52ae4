//! Cart line items.

use serde::{Deserialize, Serialize};

use super::price::Price;

/// One distinct product in the cart.
///
/// A cart holds at most one line item per `name`. The price is the one seen on
/// the first add; later adds only bump `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product name, unique within the cart.
    pub name: String,
    /// Unit price captured on first add.
    pub price: Price,
    /// Number of units, always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// A fresh line item with quantity 1.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            price,
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Sum of all line totals.
#[must_use]
pub fn cart_total(items: &[CartLineItem]) -> Price {
    items.iter().map(CartLineItem::line_total).sum()
}

/// Total number of units across all line items (cart badge count).
#[must_use]
pub fn cart_item_count(items: &[CartLineItem]) -> u32 {
    items
        .iter()
        .fold(0, |count, item| count.saturating_add(item.quantity))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let mut item = CartLineItem::new("Yoga Mat", Price::from_cents(2000));
        item.quantity = 3;
        assert_eq!(item.line_total(), Price::from_cents(6000));
    }

    #[test]
    fn test_cart_total_and_count() {
        let items = vec![
            CartLineItem {
                name: "Yoga Mat".to_string(),
                price: Price::from_cents(2000),
                quantity: 2,
            },
            CartLineItem::new("Water Bottle", Price::from_cents(550)),
        ];
        assert_eq!(cart_total(&items), Price::from_cents(4550));
        assert_eq!(cart_item_count(&items), 3);
        assert_eq!(cart_total(&[]), Price::ZERO);
    }

    #[test]
    fn test_decodes_numeric_price() {
        let item: CartLineItem =
            serde_json::from_str(r#"{"name":"Water Bottle","price":5.5,"quantity":1}"#).unwrap();
        assert_eq!(item.price, Price::from_cents(550));
    }
}
