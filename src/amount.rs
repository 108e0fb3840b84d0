//! Minor-unit amounts as they appear in the page's `data-amount` attributes.

use std::fmt;

use serde::Serialize;

use crate::error::{CheckoutError, CheckoutResult};

/// An integer amount in minor currency units (cents).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayAmount(i64);

impl DisplayAmount {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Parse the raw value of a `data-amount` attribute.
    pub fn parse_attribute(raw: Option<&str>) -> CheckoutResult<Self> {
        let Some(raw) = raw else {
            return Err(CheckoutError::InvalidAmount {
                value: None,
                reason: "attribute is missing".into(),
            });
        };
        raw.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| CheckoutError::InvalidAmount {
                value: Some(raw.to_string()),
                reason: e.to_string(),
            })
    }

    /// Major units with exactly two decimals: `1050` renders as `10.50`.
    pub fn formatted(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Price descriptor sent to the backend. A single mapping, not a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ItemsPrice {
    pub amount: DisplayAmount,
}

/// Body of `POST /create-payment-intent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentIntentRequest {
    pub items_price: ItemsPrice,
}

impl From<ItemsPrice> for PaymentIntentRequest {
    fn from(items_price: ItemsPrice) -> Self {
        Self { items_price }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_like_to_fixed_two() {
        let cases = [
            (1050, "10.50"),
            (5, "0.05"),
            (0, "0.00"),
            (2300, "23.00"),
            (99, "0.99"),
            (100, "1.00"),
            (123456789, "1234567.89"),
            (-5, "-0.05"),
            (-1050, "-10.50"),
        ];
        for (cents, expected) in cases {
            assert_eq!(DisplayAmount::from_cents(cents).formatted(), expected, "{cents}");
        }
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert_eq!(
            DisplayAmount::from_cents(i64::MIN).formatted(),
            "-92233720368547758.08"
        );
    }

    #[test]
    fn parses_integer_attributes() {
        assert_eq!(
            DisplayAmount::parse_attribute(Some("2500")).unwrap(),
            DisplayAmount::from_cents(2500)
        );
        assert_eq!(
            DisplayAmount::parse_attribute(Some(" 2800\n")).unwrap().cents(),
            2800
        );
    }

    #[test]
    fn rejects_missing_and_non_numeric_attributes() {
        assert!(matches!(
            DisplayAmount::parse_attribute(None),
            Err(CheckoutError::InvalidAmount { value: None, .. })
        ));
        for raw in ["", "ten", "10.50", "$5"] {
            match DisplayAmount::parse_attribute(Some(raw)) {
                Err(CheckoutError::InvalidAmount { value, .. }) => {
                    assert_eq!(value.as_deref(), Some(raw))
                }
                other => panic!("{raw:?} parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn request_body_shape() {
        let request = PaymentIntentRequest::from(ItemsPrice {
            amount: DisplayAmount::from_cents(2300),
        });
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({ "items_price": { "amount": 2300 } })
        );
    }
}
