//! Wires the live page, Stripe.js and the fetch backend into a controller.

use std::rc::Rc;

use log::info;
use wasm_bindgen_futures::spawn_local;

use crate::backend::HttpBackend;
use crate::client::StripeClient;
use crate::config::CheckoutConfig;
use crate::controller::{format_amounts, PaymentFormController};
use crate::dom::{DomPage, WindowTimer};
use crate::error::CheckoutResult;
use crate::interop::{dom_ready, ensure_stripe_js};
use crate::page::PaymentPage;

pub async fn run(config: CheckoutConfig) -> CheckoutResult<()> {
    dom_ready().await?;
    let document = gloo_utils::document();
    // Prices render even when the checkout markup or Stripe.js is broken.
    let items_price = format_amounts(&document);
    let page = Rc::new(DomPage::bind(document)?);

    ensure_stripe_js(&config.stripe_js_url).await?;
    let sdk = StripeClient::new(&config)?;
    let backend = HttpBackend::new(config.create_intent_url.clone());
    info!("checkout page starting, intents from {}", backend.endpoint());

    let controller = Rc::new(PaymentFormController::new(
        config,
        Rc::clone(&page),
        sdk,
        backend,
        WindowTimer,
    ));

    // Registered before the element is mounted so an early submit never
    // falls through to a native form post.
    if page.has_payment_form() {
        let on_submit = Rc::clone(&controller);
        page.on_submit(move || {
            let controller = Rc::clone(&on_submit);
            spawn_local(async move { controller.handle_submit().await });
        })?;
    }

    controller.run_priced(items_price).await
}
