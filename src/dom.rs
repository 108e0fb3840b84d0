//! `web_sys` implementation of [`PaymentPage`] and [`Timer`].

use std::time::Duration;

use gloo_utils::format::JsValueSerdeExt;
use log::{debug, warn};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Document, Element, Event, HtmlButtonElement};

use crate::error::{CheckoutError, CheckoutResult};
use crate::page::{ids, AmountDisplay, PaymentPage, Timer, AMOUNT_ATTRIBUTE, AMOUNT_CLASS, HIDDEN_CLASS};

/// Event dispatched from `#payment-details` when no status can be shown.
pub const ERROR_STATE_EVENT: &str = "checkout:error-state";

/// What the submit controls look like in one loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingView {
    pub submit_disabled: bool,
    pub spinner_hidden: bool,
    pub button_text_hidden: bool,
}

impl LoadingView {
    pub fn new(loading: bool) -> Self {
        Self {
            submit_disabled: loading,
            spinner_hidden: !loading,
            button_text_hidden: loading,
        }
    }
}

/// `#payment-message` contents and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageView<'a> {
    pub text: &'a str,
    pub hidden: bool,
}

impl<'a> MessageView<'a> {
    pub fn showing(text: &'a str) -> Self {
        Self { text, hidden: false }
    }

    pub fn cleared() -> Self {
        Self {
            text: "",
            hidden: true,
        }
    }
}

/// First value of `name` in a `location.search` string, if non-empty.
pub fn search_param(search: &str, name: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// `detail` of the [`ERROR_STATE_EVENT`].
pub fn error_state_detail(error: &CheckoutError) -> serde_json::Value {
    serde_json::json!({ "message": error.to_string() })
}

/// Feed each element's raw amount through `render` and write back whatever
/// it returns.
fn rewrite_each<E>(
    elements: impl IntoIterator<Item = E>,
    read: impl Fn(&E) -> Option<String>,
    write: impl Fn(&E, &str),
    render: &mut dyn FnMut(Option<&str>) -> Option<String>,
) {
    for element in elements {
        let raw = read(&element);
        if let Some(text) = render(raw.as_deref()) {
            write(&element, &text);
        }
    }
}

/// Elements a page with `#payment-form` must also provide.
#[derive(Debug, Clone)]
struct CheckoutElements {
    form: Element,
    message: Element,
    submit: HtmlButtonElement,
    spinner: Element,
    button_text: Element,
}

impl CheckoutElements {
    fn resolve(document: &Document) -> CheckoutResult<Option<Self>> {
        let Some(form) = document.get_element_by_id(ids::PAYMENT_FORM) else {
            return Ok(None);
        };
        require(document, ids::PAYMENT_ELEMENT)?;
        let submit = require(document, ids::SUBMIT)?
            .dyn_into::<HtmlButtonElement>()
            .map_err(|_| CheckoutError::Js(format!("#{} is not a <button>", ids::SUBMIT)))?;
        Ok(Some(Self {
            form,
            message: require(document, ids::PAYMENT_MESSAGE)?,
            submit,
            spinner: require(document, ids::SPINNER)?,
            button_text: require(document, ids::BUTTON_TEXT)?,
        }))
    }
}

fn require(document: &Document, id: &'static str) -> CheckoutResult<Element> {
    document
        .get_element_by_id(id)
        .ok_or(CheckoutError::MissingElement(id))
}

fn set_hidden(element: &Element, hidden: bool) {
    let classes = element.class_list();
    let result = if hidden {
        classes.add_1(HIDDEN_CLASS)
    } else {
        classes.remove_1(HIDDEN_CLASS)
    };
    if let Err(err) = result {
        warn!("could not toggle .{HIDDEN_CLASS} on #{}: {err:?}", element.id());
    }
}

/// The live document, with its checkout elements resolved up front.
#[derive(Debug, Clone)]
pub struct DomPage {
    document: Document,
    checkout: Option<CheckoutElements>,
    details: Option<Element>,
}

impl DomPage {
    /// Fails when `#payment-form` exists but one of its companions doesn't.
    pub fn bind(document: Document) -> CheckoutResult<Self> {
        let checkout = CheckoutElements::resolve(&document)?;
        let details = document.get_element_by_id(ids::PAYMENT_DETAILS);
        debug!(
            "bound page: payment form {}, payment details {}",
            checkout.is_some(),
            details.is_some()
        );
        Ok(Self {
            document,
            checkout,
            details,
        })
    }

    /// Intercept `#payment-form` submission. The default navigation is always
    /// prevented; `handler` runs for every submit.
    pub fn on_submit(&self, handler: impl Fn() + 'static) -> CheckoutResult<()> {
        let Some(checkout) = &self.checkout else {
            return Err(CheckoutError::MissingElement(ids::PAYMENT_FORM));
        };
        let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            handler();
        });
        checkout
            .form
            .add_event_listener_with_callback("submit", listener.as_ref().unchecked_ref())
            .map_err(CheckoutError::from_js)?;
        // Lives as long as the page.
        listener.forget();
        Ok(())
    }

    fn show_message_view(&self, view: MessageView<'_>) {
        if let Some(checkout) = &self.checkout {
            set_hidden(&checkout.message, view.hidden);
            checkout.message.set_text_content(Some(view.text));
        }
    }

    fn dispatch_error_state(&self, details: &Element, error: &CheckoutError) -> CheckoutResult<()> {
        let detail = JsValue::from_serde(&error_state_detail(error))
            .map_err(|e| CheckoutError::Js(e.to_string()))?;
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_detail(&detail);
        let event = CustomEvent::new_with_event_init_dict(ERROR_STATE_EVENT, &init)
            .map_err(CheckoutError::from_js)?;
        details
            .dispatch_event(&event)
            .map_err(CheckoutError::from_js)?;
        Ok(())
    }
}

impl AmountDisplay for Document {
    fn rewrite_amounts(&self, render: &mut dyn FnMut(Option<&str>) -> Option<String>) {
        let amounts = self.get_elements_by_class_name(AMOUNT_CLASS);
        rewrite_each(
            (0..amounts.length()).filter_map(|index| amounts.item(index)),
            |element| element.get_attribute(AMOUNT_ATTRIBUTE),
            |element, text| element.set_text_content(Some(text)),
            render,
        );
    }
}

impl AmountDisplay for DomPage {
    fn rewrite_amounts(&self, render: &mut dyn FnMut(Option<&str>) -> Option<String>) {
        self.document.rewrite_amounts(render);
    }
}

impl PaymentPage for DomPage {
    fn has_payment_form(&self) -> bool {
        self.checkout.is_some()
    }

    fn has_payment_details(&self) -> bool {
        self.details.is_some()
    }

    fn show_message(&self, text: &str) {
        self.show_message_view(MessageView::showing(text));
    }

    fn clear_message(&self) {
        self.show_message_view(MessageView::cleared());
    }

    fn set_loading(&self, loading: bool) {
        if let Some(checkout) = &self.checkout {
            let view = LoadingView::new(loading);
            checkout.submit.set_disabled(view.submit_disabled);
            set_hidden(&checkout.spinner, view.spinner_hidden);
            set_hidden(&checkout.button_text, view.button_text_hidden);
        }
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let search = gloo_utils::window().location().search().ok()?;
        search_param(&search, name)
    }

    fn render_status(&self, text: &str) {
        match self.document.get_element_by_id(ids::PAYMENT_STATUS) {
            Some(status) => status.set_text_content(Some(text)),
            None => debug!("no #{} element, status not rendered", ids::PAYMENT_STATUS),
        }
    }

    fn set_error_state(&self, error: &CheckoutError) {
        warn!("payment status unavailable: {error}");
        if let Some(details) = &self.details {
            if let Err(err) = self.dispatch_error_state(details, error) {
                warn!("could not dispatch {ERROR_STATE_EVENT}: {err}");
            }
        }
    }
}

/// `window.setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowTimer;

impl Timer for WindowTimer {
    fn after(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let callback = Closure::once_into_js(move || callback());
        if let Err(err) = gloo_utils::window()
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            warn!("setTimeout failed: {err:?}");
        }
    }
}
