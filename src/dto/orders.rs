use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Units to buy; defaults to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutStarted {
    pub session_id: String,
    /// Hosted payment page the client should redirect to.
    pub checkout_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceDownload {
    pub invoice_pdf_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PortalStarted {
    pub portal_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutResultQuery {
    pub success: Option<String>,
    pub canceled: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResult {
    pub success: bool,
    pub canceled: bool,
}
