pub mod client;
pub mod webhook;

pub use client::{
    CheckoutSession, CheckoutSessionParams, Customer, Invoice, PortalSession, StripeClient,
    StripeConfig, StripeError,
};
pub use webhook::{EventKind, WebhookError, WebhookEvent, construct_event};
