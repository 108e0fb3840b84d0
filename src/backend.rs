//! Outbound call to the merchant backend that creates the PaymentIntent.

use async_trait::async_trait;
use gloo_net::http::Request;
use log::debug;
use serde::Deserialize;

use crate::amount::PaymentIntentRequest;
use crate::error::{CheckoutError, CheckoutResult};
use crate::intent::ClientSecret;

#[async_trait(?Send)]
pub trait IntentBackend {
    /// Exchange a price descriptor for a PaymentIntent client secret.
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> CheckoutResult<ClientSecret>;
}

/// `{ "clientSecret": "..." }`
#[derive(Debug, Deserialize)]
struct CreateIntentResponse {
    #[serde(rename = "clientSecret", alias = "client_secret")]
    client_secret: ClientSecret,
}

/// `{ "error": "..." }`, sent alongside a 4xx.
#[derive(Debug, Default, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    error: String,
}

/// JSON-over-fetch backend.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl IntentBackend for HttpBackend {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> CheckoutResult<ClientSecret> {
        debug!("POST {} {:?}", self.endpoint, request);
        let response = Request::post(&self.endpoint).json(request)?.send().await?;

        let body = if response.ok() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };
        let client_secret = read_create_response(response.status(), response.ok(), &body)?;
        debug!("created {client_secret:?}");
        Ok(client_secret)
    }
}

/// Interpret the backend's answer: the client secret on success, a
/// [`CheckoutError::Server`] otherwise.
fn read_create_response(status: u16, ok: bool, body: &str) -> CheckoutResult<ClientSecret> {
    if !ok {
        return Err(server_error(status, body));
    }
    let parsed: CreateIntentResponse =
        serde_json::from_str(body).map_err(gloo_net::Error::SerdeError)?;
    Ok(parsed.client_secret)
}

fn server_error(status: u16, body: &str) -> CheckoutError {
    let message = serde_json::from_str::<BackendErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    CheckoutError::Server { status, message }
}
