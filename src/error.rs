//! Error types shared by the checkout page.
//!
//! `StripeError` mirrors the error object Stripe.js hands back from
//! `confirmPayment` / `retrievePaymentIntent`; `CheckoutError` is everything
//! else that can go wrong while wiring the page.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Text shown for any failure the customer can't act on.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Stripe's error `type` field.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripeErrorType {
    CardError,
    ValidationError,
    InvalidRequestError,
    ApiError,
    ApiConnectionError,
    AuthenticationError,
    RateLimitError,
    IdempotencyError,
    #[serde(other)]
    Unknown,
}

/// Representation of a Stripe.js error object.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StripeError {
    /// Human-readable message. Stripe omits it for some error types.
    #[serde(default)]
    pub message: String,
    /// Stripe's error type, e.g. `"card_error"`.
    #[serde(rename = "type", default)]
    pub error_type: Option<StripeErrorType>,
    /// Optional Stripe error code, e.g. `"card_declined"`.
    #[serde(default)]
    pub code: Option<String>,
}

impl StripeError {
    /// Error raised on our side of the binding (serialization, missing global...).
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
            code: None,
        }
    }

    /// Whether Stripe meant `message` to be shown to the customer.
    pub fn is_customer_facing(&self) -> bool {
        matches!(
            self.error_type,
            Some(StripeErrorType::CardError | StripeErrorType::ValidationError)
        )
    }

    /// The text to put in the payment message region for this error.
    pub fn customer_message(&self) -> &str {
        if self.is_customer_facing() && !self.message.is_empty() {
            &self.message
        } else {
            UNEXPECTED_ERROR_MESSAGE
        }
    }

}

impl fmt::Display for StripeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error_type, &self.code) {
            (Some(kind), Some(code)) => write!(f, "{kind:?} ({code}): {}", self.message),
            (Some(kind), None) => write!(f, "{kind:?}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for StripeError {}

/// Everything that can fail while driving the checkout page.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("required element #{0} is missing from the page")]
    MissingElement(&'static str),

    #[error("invalid data-amount {value:?}: {reason}")]
    InvalidAmount { value: Option<String>, reason: String },

    #[error("request to payment backend failed: {0}")]
    Http(#[from] gloo_net::Error),

    #[error("payment backend responded {status}: {message}")]
    Server { status: u16, message: String },

    #[error("stripe: {0}")]
    Stripe(#[from] StripeError),

    #[error("missing `payment_intent_client_secret` query parameter")]
    MissingClientSecret,

    #[error("invalid checkout config: {0}")]
    Config(String),

    #[error("javascript error: {0}")]
    Js(String),
}

impl CheckoutError {
    /// Wrap a thrown JS value, keeping whatever text it carries.
    pub fn from_js(value: JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<web_sys::js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Js(text)
    }
}

impl From<serde_wasm_bindgen::Error> for CheckoutError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<CheckoutError> for JsValue {
    fn from(err: CheckoutError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> StripeError {
        serde_json::from_value(value).expect("valid stripe error")
    }

    #[test]
    fn card_errors_are_shown_verbatim() {
        let err = parse(json!({
            "type": "card_error",
            "code": "card_declined",
            "message": "Your card was declined."
        }));
        assert!(err.is_customer_facing());
        assert_eq!(err.customer_message(), "Your card was declined.");
    }

    #[test]
    fn validation_errors_are_shown_verbatim() {
        let err = parse(json!({
            "type": "validation_error",
            "message": "Your card number is incomplete."
        }));
        assert_eq!(err.customer_message(), "Your card number is incomplete.");
    }

    #[test]
    fn other_types_fall_back_to_generic_text() {
        let err = parse(json!({ "type": "api_error" }));
        assert_eq!(err.error_type, Some(StripeErrorType::ApiError));
        assert_eq!(err.customer_message(), UNEXPECTED_ERROR_MESSAGE);

        let err = parse(json!({ "type": "brand_new_error", "message": "internal" }));
        assert_eq!(err.error_type, Some(StripeErrorType::Unknown));
        assert_eq!(err.customer_message(), UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn untyped_errors_are_not_customer_facing() {
        let err = StripeError::local("Stripe.js is not loaded");
        assert!(!err.is_customer_facing());
        assert_eq!(err.to_string(), "Stripe.js is not loaded");
    }

    #[test]
    fn display_includes_type_and_code() {
        let err = parse(json!({
            "type": "card_error",
            "code": "expired_card",
            "message": "Your card has expired."
        }));
        assert_eq!(err.to_string(), "CardError (expired_card): Your card has expired.");
    }

    #[test]
    fn checkout_error_messages() {
        assert_eq!(
            CheckoutError::MissingElement("spinner").to_string(),
            "required element #spinner is missing from the page"
        );
        let server = CheckoutError::Server {
            status: 403,
            message: "No such price".into(),
        };
        assert_eq!(server.to_string(), "payment backend responded 403: No such price");
    }
}
