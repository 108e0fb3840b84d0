//! The page the controller drives, expressed as capabilities.
//!
//! Every element id the checkout and status pages must provide is listed in
//! [`ids`]. [`DomPage`](crate::dom::DomPage) implements these traits on top
//! of `web_sys`; tests use in-memory stand-ins.

use std::time::Duration;

use crate::error::CheckoutError;

pub mod ids {
    pub const PAYMENT_FORM: &str = "payment-form";
    pub const PAYMENT_ELEMENT: &str = "payment-element";
    pub const PAYMENT_MESSAGE: &str = "payment-message";
    pub const SUBMIT: &str = "submit";
    pub const SPINNER: &str = "spinner";
    pub const BUTTON_TEXT: &str = "button-text";
    pub const PAYMENT_DETAILS: &str = "payment-details";
    pub const PAYMENT_STATUS: &str = "payment-status";
}

/// Class carried by every element showing a `data-amount`.
pub const AMOUNT_CLASS: &str = "amount";
pub const AMOUNT_ATTRIBUTE: &str = "data-amount";
/// Class toggled to hide/show elements.
pub const HIDDEN_CLASS: &str = "hidden";

/// Selector Stripe mounts the Payment Element into.
pub fn payment_element_selector() -> String {
    format!("#{}", ids::PAYMENT_ELEMENT)
}

/// Anything holding `.amount` elements. Needs no checkout markup, so amounts
/// can be formatted before the rest of the page is bound.
pub trait AmountDisplay {
    /// Visit every amount element in document order. `render` receives the
    /// raw `data-amount` value and returns the text to display, or `None`
    /// to leave the element untouched.
    fn rewrite_amounts(&self, render: &mut dyn FnMut(Option<&str>) -> Option<String>);
}

pub trait PaymentPage: AmountDisplay {
    /// `#payment-form` is present.
    fn has_payment_form(&self) -> bool;

    /// `#payment-details` is present.
    fn has_payment_details(&self) -> bool;

    /// Put `text` in `#payment-message` and make it visible.
    fn show_message(&self, text: &str);

    /// Empty and hide `#payment-message`.
    fn clear_message(&self);

    /// Disable `#submit` and show `#spinner` (or the reverse).
    fn set_loading(&self, loading: bool);

    /// A non-empty query parameter of the current URL.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Write into `#payment-status`, if the page has one.
    fn render_status(&self, text: &str);

    /// Hook for the host page when the status page can't show a status.
    fn set_error_state(&self, error: &CheckoutError);
}

/// One-shot deferred callbacks (`setTimeout` in the browser).
pub trait Timer {
    fn after(&self, delay: Duration, callback: Box<dyn FnOnce()>);
}
