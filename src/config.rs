//! Runtime configuration handed to [`start`](crate::start) by the host page.
//!
//! ```js
//! import init, { start } from "./pkg/stripe_checkout_page.js";
//! await init();
//! start({ publishableKey: "pk_test_...", returnUrl: "https://shop.example/success" });
//! ```
//!
//! Every field except `publishableKey` has a default.

use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use serde::Deserialize;

use crate::error::{CheckoutError, CheckoutResult};

pub const DEFAULT_CREATE_INTENT_URL: &str = "/create-payment-intent";
pub const DEFAULT_RETURN_URL: &str = "http://localhost:5000/success";
pub const DEFAULT_MESSAGE_TIMEOUT_MS: u32 = 4000;
pub const DEFAULT_STRIPE_JS_URL: &str = "https://js.stripe.com/v3/";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutConfig {
    /// Stripe publishable key (`pk_...`).
    pub publishable_key: String,
    /// Backend endpoint that creates the PaymentIntent.
    pub create_intent_url: String,
    /// Where Stripe sends the customer after confirmation.
    pub return_url: String,
    /// How long an error message stays visible.
    pub message_timeout_ms: u32,
    /// Elements appearance theme (`"stripe"`, `"night"`, `"flat"`).
    pub theme: String,
    /// Payment Element layout (`"accordion"` or `"tabs"`).
    pub layout: String,
    /// Script injected when `window.Stripe` is not already present.
    pub stripe_js_url: String,
    /// `log` level filter, e.g. `"info"` or `"debug"`.
    pub log_level: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            publishable_key: String::new(),
            create_intent_url: DEFAULT_CREATE_INTENT_URL.to_string(),
            return_url: DEFAULT_RETURN_URL.to_string(),
            message_timeout_ms: DEFAULT_MESSAGE_TIMEOUT_MS,
            theme: "stripe".to_string(),
            layout: "accordion".to_string(),
            stripe_js_url: DEFAULT_STRIPE_JS_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl CheckoutConfig {
    pub fn with_publishable_key(publishable_key: impl Into<String>) -> Self {
        Self {
            publishable_key: publishable_key.into(),
            ..Self::default()
        }
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.message_timeout_ms))
    }

    pub fn log_level(&self) -> CheckoutResult<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| CheckoutError::Config(format!("unknown log level {:?}", self.log_level)))
    }

    pub fn validate(&self) -> CheckoutResult<()> {
        if !self.publishable_key.starts_with("pk_") {
            return Err(CheckoutError::Config(
                "publishableKey must be a Stripe publishable key (pk_...)".into(),
            ));
        }
        if self.create_intent_url.trim().is_empty() {
            return Err(CheckoutError::Config("createIntentUrl is empty".into()));
        }
        if self.return_url.trim().is_empty() {
            return Err(CheckoutError::Config("returnUrl is empty".into()));
        }
        self.log_level()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_the_stock_checkout_page() {
        let config: CheckoutConfig =
            serde_json::from_value(json!({ "publishableKey": "pk_test_123" })).unwrap();
        assert_eq!(config.publishable_key, "pk_test_123");
        assert_eq!(config.create_intent_url, "/create-payment-intent");
        assert_eq!(config.return_url, "http://localhost:5000/success");
        assert_eq!(config.message_timeout(), Duration::from_millis(4000));
        assert_eq!(config.theme, "stripe");
        assert_eq!(config.layout, "accordion");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_are_camel_case() {
        let config: CheckoutConfig = serde_json::from_value(json!({
            "publishableKey": "pk_live_abc",
            "returnUrl": "https://shop.example/success",
            "messageTimeoutMs": 2500,
            "layout": "tabs",
            "logLevel": "debug"
        }))
        .unwrap();
        assert_eq!(config.return_url, "https://shop.example/success");
        assert_eq!(config.message_timeout(), Duration::from_millis(2500));
        assert_eq!(config.layout, "tabs");
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn rejects_secret_keys_and_missing_keys() {
        assert!(matches!(
            CheckoutConfig::default().validate(),
            Err(CheckoutError::Config(_))
        ));
        assert!(CheckoutConfig::with_publishable_key("sk_test_123").validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = CheckoutConfig::with_publishable_key("pk_test_123");
        config.log_level = "chatty".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_endpoints() {
        let mut config = CheckoutConfig::with_publishable_key("pk_test_123");
        config.create_intent_url = " ".into();
        assert!(config.validate().is_err());

        let mut config = CheckoutConfig::with_publishable_key("pk_test_123");
        config.return_url = String::new();
        assert!(config.validate().is_err());
    }
}
