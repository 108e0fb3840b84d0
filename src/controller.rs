//! The checkout page controller.
//!
//! One [`PaymentFormController`] per page view. It formats the displayed
//! amounts, mounts the Payment Element when the page has a payment form,
//! confirms the payment on submit, and renders the PaymentIntent status on
//! the return page. Everything it touches comes in through the
//! [`PaymentPage`], [`PaymentSdk`], [`IntentBackend`] and [`Timer`] seams.

use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use log::{debug, error, info, warn};

use crate::amount::{DisplayAmount, ItemsPrice, PaymentIntentRequest};
use crate::backend::IntentBackend;
use crate::client::PaymentSdk;
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult, UNEXPECTED_ERROR_MESSAGE};
use crate::intent::{ClientSecret, PaymentResult, PaymentStatus, CLIENT_SECRET_PARAM};
use crate::page::{payment_element_selector, AmountDisplay, PaymentPage, Timer};

/// Rewrite every amount element from cents to `0.00` form and return the
/// price descriptor for the backend, taken from the last valid amount.
pub fn format_amounts<A: AmountDisplay + ?Sized>(page: &A) -> ItemsPrice {
    let mut last = None;
    page.rewrite_amounts(&mut |raw: Option<&str>| match DisplayAmount::parse_attribute(raw) {
        Ok(amount) => {
            last = Some(amount);
            Some(amount.formatted())
        }
        Err(err) => {
            warn!("leaving amount element as is: {err}");
            None
        }
    });
    ItemsPrice {
        amount: last.unwrap_or_default(),
    }
}

/// A mounted Payment Element and the intent it is bound to.
#[derive(Debug)]
pub struct PaymentSession<E> {
    pub client_secret: ClientSecret,
    pub elements: E,
}

pub struct PaymentFormController<P, S, B, T>
where
    S: PaymentSdk,
{
    config: CheckoutConfig,
    page: Rc<P>,
    sdk: S,
    backend: B,
    timer: T,
    /// Set once, by a successful [`initialize`](Self::initialize).
    session: OnceCell<PaymentSession<S::Elements>>,
    initializing: Cell<bool>,
    submitting: Cell<bool>,
    message_generation: Rc<Cell<u64>>,
}

impl<P, S, B, T> PaymentFormController<P, S, B, T>
where
    P: PaymentPage + 'static,
    S: PaymentSdk,
    B: IntentBackend,
    T: Timer,
{
    pub fn new(config: CheckoutConfig, page: Rc<P>, sdk: S, backend: B, timer: T) -> Self {
        Self {
            config,
            page,
            sdk,
            backend,
            timer,
            session: OnceCell::new(),
            initializing: Cell::new(false),
            submitting: Cell::new(false),
            message_generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    pub fn session(&self) -> Option<&PaymentSession<S::Elements>> {
        self.session.get()
    }

    /// Page-load sequence: amounts, then checkout and/or status.
    pub async fn run(&self) -> CheckoutResult<()> {
        let items_price = self.format_amounts();
        self.run_priced(items_price).await
    }

    /// [`run`](Self::run) for a page whose amounts were already formatted.
    pub async fn run_priced(&self, items_price: ItemsPrice) -> CheckoutResult<()> {
        let initialized = if self.page.has_payment_form() {
            self.initialize(items_price).await
        } else {
            Ok(())
        };

        if self.page.has_payment_details() {
            if let Ok(status) = self.check_status().await {
                info!("payment status: {status}");
            }
        }

        initialized
    }

    pub fn format_amounts(&self) -> ItemsPrice {
        format_amounts(&*self.page)
    }

    /// Create the PaymentIntent and mount the Payment Element. A call made
    /// after success, or while another call is in flight, does nothing.
    pub async fn initialize(&self, items_price: ItemsPrice) -> CheckoutResult<()> {
        if self.session.get().is_some() {
            debug!("payment element already mounted");
            return Ok(());
        }
        if self.initializing.replace(true) {
            debug!("payment element is already being mounted");
            return Ok(());
        }
        let opened = self.open_session(items_price).await;
        self.initializing.set(false);

        match opened {
            Ok(session) => {
                info!("payment element mounted for {:?}", session.client_secret);
                if self.session.set(session).is_err() {
                    warn!("payment element mounted twice");
                }
                Ok(())
            }
            Err(err) => {
                error!("checkout initialization failed: {err}");
                self.show_message(UNEXPECTED_ERROR_MESSAGE);
                Err(err)
            }
        }
    }

    async fn open_session(
        &self,
        items_price: ItemsPrice,
    ) -> CheckoutResult<PaymentSession<S::Elements>> {
        let request = PaymentIntentRequest::from(items_price);
        let client_secret = self.backend.create_payment_intent(&request).await?;
        let elements = self
            .sdk
            .mount_payment_element(&client_secret, &payment_element_selector())
            .await?;
        Ok(PaymentSession {
            client_secret,
            elements,
        })
    }

    /// Confirm the payment. Only returns when Stripe answered without
    /// navigating away; a redirect leaves the page mid-await.
    pub async fn handle_submit(&self) {
        let Some(session) = self.session.get() else {
            warn!("submit ignored: payment element is not mounted yet");
            return;
        };
        if self.submitting.replace(true) {
            debug!("submit ignored: confirmation already in flight");
            return;
        }
        self.page.set_loading(true);

        match self
            .sdk
            .confirm_payment(&session.elements, &self.config.return_url)
            .await
        {
            PaymentResult::Error(err) => {
                warn!("confirmPayment failed: {err}");
                self.show_message(err.customer_message());
            }
            PaymentResult::Success(intent) => {
                info!("payment {} is {}", intent.id, intent.status);
            }
            PaymentResult::Pending => {
                info!("confirmPayment resolved without redirect or error");
            }
        }

        self.page.set_loading(false);
        self.submitting.set(false);
    }

    /// Return page: look up the intent named in the URL and render its status.
    pub async fn check_status(&self) -> CheckoutResult<PaymentStatus> {
        let Some(secret) = self.page.query_param(CLIENT_SECRET_PARAM) else {
            let err = CheckoutError::MissingClientSecret;
            self.page.set_error_state(&err);
            return Err(err);
        };
        let client_secret = ClientSecret::new(secret);

        match self.sdk.retrieve_payment_intent(&client_secret).await {
            Ok(intent) => {
                self.page
                    .render_status(&format!("Payment Status: {}", intent.status));
                Ok(intent.status)
            }
            Err(err) => {
                let err = CheckoutError::from(err);
                self.page.set_error_state(&err);
                Err(err)
            }
        }
    }

    /// Show `text` in the message region and hide it again after the
    /// configured timeout. A newer message is not cleared by an older timer.
    pub fn show_message(&self, text: &str) {
        let generation = self.message_generation.get().wrapping_add(1);
        self.message_generation.set(generation);
        self.page.show_message(text);

        let page = Rc::clone(&self.page);
        let current = Rc::clone(&self.message_generation);
        self.timer.after(
            self.config.message_timeout(),
            Box::new(move || {
                if current.get() == generation {
                    page.clear_message();
                }
            }),
        );
    }
}
