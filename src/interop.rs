//! stripe_checkout_page/src/interop.rs
//!
//! Page-lifecycle glue: wait for the DOM, load Stripe.js at runtime.
//!
//! # Overview
//! [`ensure_stripe_js`] injects a single
//! `<script id="stripejs-sdk" src="https://js.stripe.com/v3/">`
//! into `<head>` on first use and resolves once the script's `load` event
//! fires. If `window.Stripe` already exists nothing is injected. A tag
//! injected by an earlier call records its progress in `data-state`: one
//! still loading is awaited, one that finished without defining
//! `window.Stripe`, or any tag it didn't inject, is replaced.

use log::debug;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Function, Promise, Reflect};
use web_sys::{Document, HtmlScriptElement};

use crate::error::{CheckoutError, CheckoutResult};

/// id of the injected `<script>` tag.
pub const STRIPE_SCRIPT_ID: &str = "stripejs-sdk";
/// Attribute on the tag tracking its load progress.
pub const SCRIPT_STATE_ATTRIBUTE: &str = "data-state";

/// What to do about Stripe.js given what is already on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    /// `window.Stripe` exists.
    Ready,
    /// No tag yet.
    Inject,
    /// A tag injected here is still loading; wait for its events.
    Await,
    /// Stripe is missing and the tag is finished or untracked.
    Replace,
}

impl ScriptAction {
    /// `tag_state` is `None` without a tag, else its `data-state` value.
    pub fn decide(stripe_loaded: bool, tag_state: Option<Option<&str>>) -> Self {
        match (stripe_loaded, tag_state) {
            (true, _) => Self::Ready,
            (false, None) => Self::Inject,
            (false, Some(Some("loading"))) => Self::Await,
            (false, Some(_)) => Self::Replace,
        }
    }
}

/// `true` once `window.Stripe` exists.
pub fn stripe_js_loaded() -> bool {
    Reflect::has(&gloo_utils::window(), &JsValue::from_str("Stripe")).unwrap_or(false)
}

/// Load Stripe.js from `src` unless it is already on the page.
pub async fn ensure_stripe_js(src: &str) -> CheckoutResult<()> {
    let document = gloo_utils::document();
    let existing = document.get_element_by_id(STRIPE_SCRIPT_ID);
    let tag_state = existing
        .as_ref()
        .map(|tag| tag.get_attribute(SCRIPT_STATE_ATTRIBUTE));
    let action = ScriptAction::decide(
        stripe_js_loaded(),
        tag_state.as_ref().map(|state| state.as_deref()),
    );

    let script: HtmlScriptElement = match (action, existing) {
        (ScriptAction::Ready, _) => return Ok(()),
        (ScriptAction::Await, Some(tag)) => tag.dyn_into::<HtmlScriptElement>().map_err(|_| {
            CheckoutError::Js(format!("#{STRIPE_SCRIPT_ID} is not a <script>"))
        })?,
        (ScriptAction::Replace, Some(stale)) => {
            debug!("replacing stale #{STRIPE_SCRIPT_ID}");
            stale.remove();
            inject_script(&document, src)?
        }
        _ => inject_script(&document, src)?,
    };

    let loaded = Promise::new(&mut |resolve: Function, reject: Function| {
        if let Err(err) = script.add_event_listener_with_callback("load", &resolve) {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
        if let Err(err) = script.add_event_listener_with_callback("error", &reject) {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
    });
    JsFuture::from(loaded).await.map_err(|_| {
        CheckoutError::Js(format!("failed to load Stripe.js from {src}"))
    })?;

    if !stripe_js_loaded() {
        return Err(CheckoutError::Js("Stripe.js loaded but window.Stripe is missing".into()));
    }
    debug!("Stripe.js ready");
    Ok(())
}

fn inject_script(document: &Document, src: &str) -> CheckoutResult<HtmlScriptElement> {
    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(CheckoutError::from_js)?
        .dyn_into()
        .map_err(|_| CheckoutError::Js("created element is not a <script>".into()))?;

    script.set_id(STRIPE_SCRIPT_ID);
    script.set_src(src);
    script
        .set_attribute(SCRIPT_STATE_ATTRIBUTE, "loading")
        .map_err(CheckoutError::from_js)?;
    track_state(&script, "load", "loaded")?;
    track_state(&script, "error", "error")?;

    document
        .head()
        .ok_or(CheckoutError::MissingElement("head"))?
        .append_child(&script)
        .map_err(CheckoutError::from_js)?;
    debug!("injected {src}");
    Ok(script)
}

/// Record the outcome in `data-state` when `event` fires.
fn track_state(script: &HtmlScriptElement, event: &str, state: &'static str) -> CheckoutResult<()> {
    let tag = script.clone();
    let listener = Closure::<dyn FnMut()>::new(move || {
        if let Err(err) = tag.set_attribute(SCRIPT_STATE_ATTRIBUTE, state) {
            debug!("could not mark #{STRIPE_SCRIPT_ID} {state}: {err:?}");
        }
    });
    script
        .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
        .map_err(CheckoutError::from_js)?;
    listener.forget();
    Ok(())
}

/// Resolve once `DOMContentLoaded` has fired (immediately if it already has).
pub async fn dom_ready() -> CheckoutResult<()> {
    let document = gloo_utils::document();
    if document.ready_state() != "loading" {
        return Ok(());
    }
    let ready = Promise::new(&mut |resolve: Function, reject: Function| {
        if let Err(err) = document.add_event_listener_with_callback("DOMContentLoaded", &resolve) {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
    });
    JsFuture::from(ready).await.map_err(CheckoutError::from_js)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_stripe_needs_nothing() {
        assert_eq!(ScriptAction::decide(true, None), ScriptAction::Ready);
        assert_eq!(ScriptAction::decide(true, Some(Some("error"))), ScriptAction::Ready);
    }

    #[test]
    fn missing_tag_is_injected() {
        assert_eq!(ScriptAction::decide(false, None), ScriptAction::Inject);
    }

    #[test]
    fn loading_tag_is_awaited() {
        assert_eq!(ScriptAction::decide(false, Some(Some("loading"))), ScriptAction::Await);
    }

    #[test]
    fn finished_tag_without_stripe_is_replaced() {
        assert_eq!(ScriptAction::decide(false, Some(Some("error"))), ScriptAction::Replace);
        assert_eq!(ScriptAction::decide(false, Some(Some("loaded"))), ScriptAction::Replace);
    }

    #[test]
    fn untracked_tag_without_stripe_is_replaced() {
        assert_eq!(ScriptAction::decide(false, Some(None)), ScriptAction::Replace);
    }
}
