mod amount;
mod backend;
mod bindings;
mod boot;
mod client;
mod config;
mod controller;
mod dom;
mod error;
mod intent;
mod page;
pub mod interop;
pub mod logging;

pub use amount::*;
pub use backend::*;
pub use bindings::*;
pub use client::*;
pub use config::*;
pub use controller::*;
pub use dom::*;
pub use error::*;
pub use intent::*;
pub use page::*;

use wasm_bindgen::prelude::*;

/// Entry point for the host page. `config` is a [`CheckoutConfig`] object;
/// the checkout itself starts once the DOM is ready.
#[wasm_bindgen]
pub fn start(config: JsValue) -> Result<(), JsValue> {
    let config: CheckoutConfig = if config.is_undefined() || config.is_null() {
        CheckoutConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(CheckoutError::from)?
    };
    config.validate()?;
    logging::init(config.log_level()?);

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = boot::run(config).await {
            log::error!("checkout page failed to start: {err}");
        }
    });
    Ok(())
}
