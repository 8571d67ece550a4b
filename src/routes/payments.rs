use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CheckoutRequest, CheckoutResult, CheckoutResultQuery, CheckoutStarted, PortalStarted,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::{order_service, webhook_service},
    state::AppState,
    stripe::WebhookError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout/{antique_id}", post(start_checkout))
        .route("/checkout-result", get(checkout_result))
        .route("/webhook", post(stripe_webhook))
        .route("/portal", post(billing_portal))
}

#[utoipa::path(
    post,
    path = "/api/payments/checkout/{antique_id}",
    params(("antique_id" = Uuid, Path, description = "Antique to buy")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Hosted checkout session", body = ApiResponse<CheckoutStarted>),
        (status = 400, description = "Out of stock or not purchasable"),
        (status = 404, description = "Antique not found"),
    ),
    tag = "Payments"
)]
pub async fn start_checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(antique_id): Path<Uuid>,
    payload: Option<Json<CheckoutRequest>>,
) -> AppResult<Json<ApiResponse<CheckoutStarted>>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let resp = order_service::start_checkout(&state, &user, antique_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/checkout-result",
    params(
        ("success" = Option<String>, Query, description = "Set by the success redirect"),
        ("canceled" = Option<String>, Query, description = "Set by the cancel redirect"),
    ),
    responses(
        (status = 200, description = "Post-redirect landing state", body = ApiResponse<CheckoutResult>)
    ),
    tag = "Payments"
)]
pub async fn checkout_result(
    Query(query): Query<CheckoutResultQuery>,
) -> Json<ApiResponse<CheckoutResult>> {
    let data = CheckoutResult {
        success: query.success.as_deref() == Some("true"),
        canceled: query.canceled.as_deref() == Some("true"),
    };
    Json(ApiResponse::success(
        "Checkout result",
        data,
        Some(Meta::empty()),
    ))
}

// The raw body is required: the signature covers the exact bytes sent.
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    responses(
        (status = 200, description = "Event processed or ignored"),
        (status = 400, description = "Bad signature or malformed payload"),
        (status = 404, description = "Referenced user or listing no longer exists"),
    ),
    tag = "Payments"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let sig_header = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Webhook(WebhookError::BadHeader))?;

    let resp = webhook_service::handle_webhook(&state, body.as_bytes(), sig_header).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/portal",
    responses(
        (status = 200, description = "Billing portal session", body = ApiResponse<PortalStarted>),
        (status = 400, description = "No billing profile yet"),
    ),
    tag = "Payments"
)]
pub async fn billing_portal(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PortalStarted>>> {
    let resp = order_service::billing_portal(&state, &user).await?;
    Ok(Json(resp))
}
