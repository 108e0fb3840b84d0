//! stripe_checkout_page/src/client.rs
//!
//! Typed Rust API over the Stripe.js Payment Element.
//!
//! This module provides:
//! - [`PaymentSdk`], the seam the controller talks to.
//! - `ElementsOptions` / `PaymentElementOptions` / `ConfirmPaymentParams`, the
//!   option objects passed to Stripe.js.
//! - [`StripeClient`], the `PaymentSdk` backed by `window.Stripe`.
//!
//! # Example Usage
//! ```rust,ignore
//! let client = StripeClient::new(&config)?;
//! let elements = client
//!     .mount_payment_element(&client_secret, "#payment-element")
//!     .await?;
//! match client.confirm_payment(&elements, &config.return_url).await {
//!     PaymentResult::Error(err) => log::warn!("declined: {err}"),
//!     other => log::info!("confirmed: {other:?}"),
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Object, Reflect};

use crate::bindings::{new_stripe, JsElements, JsStripe};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult, StripeError};
use crate::intent::{ClientSecret, PaymentIntentInfo, PaymentResult, SdkResponse};

/// The hosted payment SDK, as far as the checkout page uses it.
#[async_trait(?Send)]
pub trait PaymentSdk {
    /// Handle to the mounted element group, needed again to confirm.
    type Elements;

    /// Build Elements for `client_secret`, create a Payment Element and
    /// mount it at `selector`.
    async fn mount_payment_element(
        &self,
        client_secret: &ClientSecret,
        selector: &str,
    ) -> Result<Self::Elements, StripeError>;

    /// Confirm the PaymentIntent behind `elements`, redirecting to
    /// `return_url` when the payment method needs it.
    async fn confirm_payment(&self, elements: &Self::Elements, return_url: &str) -> PaymentResult;

    /// Look up the PaymentIntent for `client_secret`.
    async fn retrieve_payment_intent(
        &self,
        client_secret: &ClientSecret,
    ) -> Result<PaymentIntentInfo, StripeError>;
}

/// Configuration for `stripe.elements({ clientSecret, appearance })`.
#[derive(Serialize, Clone, Debug)]
pub struct ElementsOptions {
    /// The PaymentIntent client secret returned by the backend.
    #[serde(rename = "clientSecret")]
    pub client_secret: String,

    /// Optional Stripe Elements appearance settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<serde_json::Value>,
}

/// Layout for `elements.create("payment", ...)`.
#[derive(Serialize, Clone, Debug)]
pub struct PaymentElementOptions {
    /// Layout mode: `"tabs"` or `"accordion"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

/// `confirmParams` for `stripe.confirmPayment`.
#[derive(Serialize, Clone, Debug)]
pub struct ConfirmPaymentParams {
    /// Where Stripe sends the customer after confirmation.
    pub return_url: String,
}

/// [`PaymentSdk`] backed by Stripe.js.
#[derive(Debug, Clone)]
pub struct StripeClient {
    stripe: JsStripe,
    appearance: serde_json::Value,
    layout: String,
}

impl StripeClient {
    /// Calls `Stripe(publishableKey)`. Stripe.js must already be loaded.
    pub fn new(config: &CheckoutConfig) -> CheckoutResult<Self> {
        let stripe = new_stripe(&config.publishable_key).map_err(CheckoutError::from_js)?;
        Ok(Self {
            stripe,
            appearance: serde_json::json!({ "theme": config.theme.as_str() }),
            layout: config.layout.clone(),
        })
    }
}

#[async_trait(?Send)]
impl PaymentSdk for StripeClient {
    type Elements = JsElements;

    async fn mount_payment_element(
        &self,
        client_secret: &ClientSecret,
        selector: &str,
    ) -> Result<JsElements, StripeError> {
        // 1) Build Elements for this intent
        let elements_options = ElementsOptions {
            client_secret: client_secret.expose().to_string(),
            appearance: Some(self.appearance.clone()),
        };
        let elements = self
            .stripe
            .elements(to_js(&elements_options)?)
            .map_err(js_to_stripe_error)?;

        // 2) Create the Payment Element
        let pe_options = PaymentElementOptions {
            layout: Some(self.layout.clone()),
        };
        let payment_element = elements
            .create_element("payment", to_js(&pe_options)?)
            .map_err(js_to_stripe_error)?;

        // 3) Mount into DOM
        payment_element.mount(selector).map_err(js_to_stripe_error)?;
        Ok(elements)
    }

    async fn confirm_payment(&self, elements: &JsElements, return_url: &str) -> PaymentResult {
        // 1) Build { elements, confirmParams }
        let params = ConfirmPaymentParams {
            return_url: return_url.to_string(),
        };
        let options = match confirm_options(elements, &params) {
            Ok(options) => options,
            Err(err) => return PaymentResult::Error(err),
        };

        // 2) Call stripe.confirmPayment
        let promise = match self.stripe.confirm_payment(options) {
            Ok(p) => p,
            Err(e) => return PaymentResult::Error(js_to_stripe_error(e)),
        };

        // 3) Await and classify { error?, paymentIntent? }
        match JsFuture::from(promise).await {
            Ok(js_val) => match from_value::<SdkResponse>(js_val) {
                Ok(response) => response.into_payment_result(),
                Err(err) => PaymentResult::Error(serde_error_to_stripe_error(err)),
            },
            Err(js_err) => PaymentResult::Error(js_to_stripe_error(js_err)),
        }
    }

    async fn retrieve_payment_intent(
        &self,
        client_secret: &ClientSecret,
    ) -> Result<PaymentIntentInfo, StripeError> {
        let promise = self
            .stripe
            .retrieve_payment_intent(client_secret.expose())
            .map_err(js_to_stripe_error)?;
        let js_val = JsFuture::from(promise).await.map_err(js_to_stripe_error)?;
        from_value::<SdkResponse>(js_val)
            .map_err(serde_error_to_stripe_error)?
            .into_intent()
    }
}

/// `{ elements, confirmParams }`
fn confirm_options(
    elements: &JsElements,
    params: &ConfirmPaymentParams,
) -> Result<JsValue, StripeError> {
    let opts = Object::new();
    Reflect::set(&opts, &JsValue::from_str("elements"), elements.as_ref())
        .map_err(js_to_stripe_error)?;
    Reflect::set(&opts, &JsValue::from_str("confirmParams"), &to_js(params)?)
        .map_err(js_to_stripe_error)?;
    Ok(opts.into())
}

/// Serialize to a plain JS object (not a `Map`), which is what Stripe.js reads.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, StripeError> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(serde_error_to_stripe_error)
}

/// Convert any caught `JsValue` into a `StripeError` with best effort.
fn js_to_stripe_error(value: JsValue) -> StripeError {
    match from_value::<StripeError>(value.clone()) {
        Ok(err) if !err.message.is_empty() => err,
        _ => StripeError::local(CheckoutError::from_js(value).to_string()),
    }
}

/// Convert a `serde_wasm_bindgen::Error` into `StripeError`.
fn serde_error_to_stripe_error(err: serde_wasm_bindgen::Error) -> StripeError {
    StripeError::local(err.to_string())
}
