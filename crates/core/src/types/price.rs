//! Decimal price representation.
//!
//! Prices are stored with their full decimal precision and only rounded when
//! displayed. All storefront prices are in US dollars.

use core::fmt;
use core::iter::Sum;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in dollars.
///
/// Serialized transparently as the inner decimal. Decoding accepts both JSON
/// strings (`"20.00"`) and JSON numbers (`20`), so slots written by older page
/// scripts remain readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a price attribute leniently.
    ///
    /// Leading whitespace and an optional sign are accepted, followed by the
    /// longest run of digits with at most one decimal point. Anything after
    /// that run is ignored (`"5.50 USD"` parses as `5.50`). Input with no
    /// leading digits, or that overflows, yields [`Price::ZERO`].
    ///
    /// ```
    /// use stride_core::Price;
    ///
    /// assert_eq!(Price::parse_lenient("20.00"), Price::from_cents(2000));
    /// assert_eq!(Price::parse_lenient(" 5.5kg"), Price::from_cents(550));
    /// assert_eq!(Price::parse_lenient("free"), Price::ZERO);
    /// ```
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let (negative, unsigned) = trimmed.strip_prefix('-').map_or_else(
            || (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
            |rest| (true, rest),
        );

        let mut end = 0;
        let mut seen_dot = false;
        for (i, c) in unsigned.char_indices() {
            if c.is_ascii_digit() {
                end = i + 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                end = i + 1;
            } else {
                break;
            }
        }

        let numeric = unsigned.get(..end).unwrap_or_default().trim_end_matches('.');
        let numeric = if numeric.starts_with('.') {
            format!("0{numeric}")
        } else {
            numeric.to_owned()
        };

        Decimal::from_str(&numeric).map_or(Self::ZERO, |amount| {
            Self(if negative { -amount } else { amount })
        })
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the price is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// The price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// The amount rounded to cents, half away from zero.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Price {
    /// Formats as dollars with exactly two decimals, e.g. `$45.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.rounded())
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, price| Self(acc.0.saturating_add(price.0)))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_decimals() {
        assert_eq!(Price::from_cents(4550).to_string(), "$45.50");
        assert_eq!(Price::new(Decimal::from(20)).to_string(), "$20.00");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Price::new(Decimal::new(1005, 3)).to_string(), "$1.01");
        assert_eq!(Price::new(Decimal::new(1004, 3)).to_string(), "$1.00");
    }

    #[test]
    fn test_parse_lenient_plain() {
        assert_eq!(Price::parse_lenient("20.00"), Price::from_cents(2000));
        assert_eq!(Price::parse_lenient("5.5"), Price::from_cents(550));
        assert_eq!(Price::parse_lenient("7"), Price::from_cents(700));
    }

    #[test]
    fn test_parse_lenient_prefix() {
        assert_eq!(Price::parse_lenient("  12.25 each"), Price::from_cents(1225));
        assert_eq!(Price::parse_lenient("1.2.3"), Price::from_cents(120));
        assert_eq!(Price::parse_lenient(".5"), Price::from_cents(50));
        assert_eq!(Price::parse_lenient("3."), Price::from_cents(300));
    }

    #[test]
    fn test_parse_lenient_unparseable_is_zero() {
        assert_eq!(Price::parse_lenient(""), Price::ZERO);
        assert_eq!(Price::parse_lenient("abc"), Price::ZERO);
        assert_eq!(Price::parse_lenient("."), Price::ZERO);
        assert_eq!(Price::parse_lenient("$20"), Price::ZERO);
    }

    #[test]
    fn test_parse_lenient_sign() {
        let negative = Price::parse_lenient("-4");
        assert!(!negative.is_positive());
        assert_eq!(negative.amount(), Decimal::from(-4));
        assert_eq!(Price::parse_lenient("+4"), Price::from_cents(400));
    }

    #[test]
    fn test_is_positive() {
        assert!(Price::from_cents(1).is_positive());
        assert!(!Price::ZERO.is_positive());
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_cents(2000).times(2), Price::from_cents(550).times(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(4550));
    }

    #[test]
    fn test_serde_accepts_string_and_number() {
        let from_str: Price = serde_json::from_str("\"20.00\"").unwrap();
        assert_eq!(from_str, Price::from_cents(2000));

        let from_int: Price = serde_json::from_str("20").unwrap();
        assert_eq!(from_int, Price::from_cents(2000));
    }
}
