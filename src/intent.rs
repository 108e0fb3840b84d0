//! PaymentIntent-side types: the client secret, intent status and the
//! shapes Stripe.js resolves its promises with.

use std::fmt;

use serde::Deserialize;

use crate::error::StripeError;

/// Query parameter Stripe appends to `return_url` after a redirect.
pub const CLIENT_SECRET_PARAM: &str = "payment_intent_client_secret";

/// Intent-scoped credential issued by the backend. Lives in memory only.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for handing to Stripe.js.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `pi_123` for `pi_123_secret_abc`; empty when the secret is not in
    /// Stripe's usual shape.
    pub fn intent_id(&self) -> &str {
        self.0
            .split_once("_secret_")
            .map(|(id, _)| id)
            .unwrap_or_default()
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.intent_id() {
            "" => f.write_str("ClientSecret(***)"),
            id => write!(f, "ClientSecret({id}_secret_***)"),
        }
    }
}

/// PaymentIntent lifecycle state as reported by Stripe.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PaymentStatus {
    Succeeded,
    Processing,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    RequiresCapture,
    Canceled,
    /// A state this crate doesn't know about yet; rendered verbatim.
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Processing => "processing",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "succeeded" => Self::Succeeded,
            "processing" => Self::Processing,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_action" => Self::RequiresAction,
            "requires_capture" => Self::RequiresCapture,
            "canceled" => Self::Canceled,
            _ => Self::Other(status),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a Stripe.js PaymentIntent object the page cares about.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PaymentIntentInfo {
    /// Stripe's identifier, e.g. `pi_1Fxxxxxx`.
    pub id: String,
    pub status: PaymentStatus,
    /// Amount in minor units.
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub last_payment_error: Option<StripeError>,
}

/// Strongly-typed outcome of `stripe.confirmPayment`.
#[derive(Clone, Debug, PartialEq)]
pub enum PaymentResult {
    /// Resolved with a PaymentIntent and no error (no redirect happened).
    Success(PaymentIntentInfo),
    /// Resolved with neither an error nor a PaymentIntent.
    Pending,
    /// Stripe reported an error before any redirect.
    Error(StripeError),
}

/// `{ error?, paymentIntent? }`, what both `confirmPayment` and
/// `retrievePaymentIntent` resolve with.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkResponse {
    #[serde(default)]
    pub error: Option<StripeError>,
    #[serde(default)]
    pub payment_intent: Option<PaymentIntentInfo>,
}

impl SdkResponse {
    pub fn into_payment_result(self) -> PaymentResult {
        match (self.error, self.payment_intent) {
            (Some(error), _) => PaymentResult::Error(error),
            (None, Some(intent)) => PaymentResult::Success(intent),
            (None, None) => PaymentResult::Pending,
        }
    }

    pub fn into_intent(self) -> Result<PaymentIntentInfo, StripeError> {
        match (self.error, self.payment_intent) {
            (Some(error), _) => Err(error),
            (None, Some(intent)) => Ok(intent),
            (None, None) => Err(StripeError::local(
                "retrievePaymentIntent resolved without a paymentIntent",
            )),
        }
    }
}
