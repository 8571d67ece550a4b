//! Minimal Stripe REST client.
//!
//! Covers only the endpoints the checkout and webhook flows need: customers,
//! checkout sessions, invoices and billing-portal sessions. Credentials are
//! held by the client instance; nothing is read from process-global state.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Overridable for tests; defaults to https://api.stripe.com.
    pub api_base: String,
}

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("stripe request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("stripe api error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub invoice_pdf: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceList {
    pub data: Vec<Invoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Inputs for a single-line-item hosted checkout session.
#[derive(Debug)]
pub struct CheckoutSessionParams {
    pub customer: String,
    pub price_id: String,
    pub quantity: i32,
    pub success_url: String,
    pub cancel_url: String,
    /// Opaque strings echoed back on the completed-session webhook.
    pub metadata: Vec<(String, String)>,
}

#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }

    pub async fn create_customer(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<Customer, StripeError> {
        let mut form = vec![("email".to_string(), email.to_string())];
        if let Some(name) = name {
            form.push(("name".to_string(), name.to_string()));
        }
        self.post_form("/v1/customers", &form).await
    }

    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, StripeError> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("customer".to_string(), params.customer.clone()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            ("line_items[0][price]".to_string(), params.price_id.clone()),
            (
                "line_items[0][quantity]".to_string(),
                params.quantity.to_string(),
            ),
            ("success_url".to_string(), params.success_url.clone()),
            ("cancel_url".to_string(), params.cancel_url.clone()),
            // One-off payments only get an invoice when asked for one.
            (
                "invoice_creation[enabled]".to_string(),
                "true".to_string(),
            ),
        ];
        for (key, value) in &params.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }
        self.post_form("/v1/checkout/sessions", &form).await
    }

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        self.get(&format!("/v1/checkout/sessions/{session_id}"), &[])
            .await
    }

    /// Invoices tied to a payment intent, newest first per Stripe ordering.
    pub async fn list_invoices(&self, payment_intent: &str) -> Result<Vec<Invoice>, StripeError> {
        let list: InvoiceList = self
            .get("/v1/invoices", &[("payment_intent", payment_intent)])
            .await?;
        Ok(list.data)
    }

    pub async fn create_portal_session(
        &self,
        customer: &str,
        return_url: &str,
    ) -> Result<PortalSession, StripeError> {
        let form = vec![
            ("customer".to_string(), customer.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];
        self.post_form("/v1/billing_portal/sessions", &form).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeError> {
        let url = format!("{}{}", self.config.api_base, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StripeError> {
        let url = format!("{}{}", self.config.api_base, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .query(query)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let message = match response.json::<ApiErrorEnvelope>().await {
            Ok(envelope) => envelope
                .error
                .message
                .unwrap_or_else(|| "unknown error".to_string()),
            Err(_) => "unreadable error response".to_string(),
        };
        Err(StripeError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
