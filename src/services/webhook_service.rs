//! Stripe webhook processing: the only writer of Order rows.
//!
//! Every delivery passes three gates before side effects: signature
//! verification, a closed-set event-kind dispatch, and an event-id
//! idempotency claim. The claim is taken inside the same transaction as the
//! handler's writes, so a failed delivery rolls the claim back and the
//! provider's retry gets a clean run, while a replayed successful delivery
//! can never double-record a sale or double-decrement stock.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait,
    sea_query::{LockType, OnConflict},
};
use sea_orm::ActiveValue::NotSet;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    entity::{
        antiques::{ActiveModel as AntiqueActive, Entity as Antiques},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        order_items::ActiveModel as OrderItemActive,
        processed_stripe_events::{
            ActiveModel as ProcessedEventActive, Column as ProcessedEventCol,
            Entity as ProcessedStripeEvents,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
    stripe::{CheckoutSession, EventKind, Invoice, WebhookError, WebhookEvent, construct_event},
};
use chrono::Utc;

/// Verify the signature, then act on the event. The raw body is required
/// because the signature covers the exact bytes Stripe sent.
pub async fn handle_webhook(
    state: &AppState,
    payload: &[u8],
    sig_header: &str,
) -> AppResult<ApiResponse<Value>> {
    let event = construct_event(payload, sig_header, state.stripe.webhook_secret())?;
    handle_event(state, event).await
}

pub async fn handle_event(state: &AppState, event: WebhookEvent) -> AppResult<ApiResponse<Value>> {
    match event.kind {
        EventKind::CheckoutSessionCompleted => {
            let session: CheckoutSession = serde_json::from_value(event.object.clone())
                .map_err(WebhookError::BadPayload)?;
            handle_checkout_completed(state, &event, session).await
        }
        EventKind::InvoiceFinalized | EventKind::InvoicePaymentSucceeded => {
            let invoice: Invoice = serde_json::from_value(event.object.clone())
                .map_err(WebhookError::BadPayload)?;
            handle_invoice_event(state, &event, invoice).await
        }
        EventKind::Unrecognized => {
            tracing::debug!(event_type = %event.event_type, "ignoring unrecognized event kind");
            Ok(ok_response("Ignored"))
        }
    }
}

/// Claim the event id within the caller's transaction. Returns false when a
/// committed delivery already claimed it; an uncommitted claim dies with its
/// transaction, so failed handlers stay retryable.
async fn claim_event(txn: &DatabaseTransaction, event: &WebhookEvent) -> AppResult<bool> {
    let rows = ProcessedStripeEvents::insert(ProcessedEventActive {
        stripe_event_id: Set(event.id.clone()),
        event_type: Set(event.event_type.clone()),
        processed_at: NotSet,
    })
    .on_conflict(
        OnConflict::column(ProcessedEventCol::StripeEventId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(txn)
    .await?;

    Ok(rows == 1)
}

/// Record the sale: one Order plus one OrderItem, and a floor-clamped stock
/// decrement, all in a single transaction with the antique row locked.
async fn handle_checkout_completed(
    state: &AppState,
    event: &WebhookEvent,
    session: CheckoutSession,
) -> AppResult<ApiResponse<Value>> {
    let (user_id, antique_id, quantity) = parse_session_metadata(&session)?;

    let txn = state.orm.begin().await?;

    if !claim_event(&txn, event).await? {
        tracing::info!(event_id = %event.id, "event already processed");
        return Ok(ok_response("Already processed"));
    }

    let buyer = Users::find_by_id(user_id).one(&txn).await?;
    if buyer.is_none() {
        tracing::warn!(session_id = %session.id, %user_id, "buyer vanished before webhook");
        return Err(AppError::NotFound);
    }

    let antique = Antiques::find_by_id(antique_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let Some(antique) = antique else {
        tracing::warn!(session_id = %session.id, %antique_id, "listing vanished before webhook");
        return Err(AppError::NotFound);
    };

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        stripe_session_id: Set(Some(session.id.clone())),
        payment_intent_id: Set(session.payment_intent.clone()),
        status: Set("paid".into()),
        invoice_pdf_url: Set(None),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        antique_id: Set(antique.id),
        quantity: Set(quantity),
        price: Set(antique.price),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let remaining = (antique.quantity - quantity).max(0);
    let mut active: AntiqueActive = antique.into();
    active.quantity = Set(remaining);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, %antique_id, quantity, remaining, "order recorded");

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "order_recorded",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "session_id": session.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order recorded",
        serde_json::json!({ "order_id": order.id }),
        Some(Meta::empty()),
    ))
}

/// Attach the receipt PDF to the order that carries the invoice's payment
/// intent. No match is not an error; Stripe may invoice things we never
/// sold, and the synchronous fallback can still pick the URL up later.
async fn handle_invoice_event(
    state: &AppState,
    event: &WebhookEvent,
    invoice: Invoice,
) -> AppResult<ApiResponse<Value>> {
    let txn = state.orm.begin().await?;

    if !claim_event(&txn, event).await? {
        tracing::info!(event_id = %event.id, "event already processed");
        return Ok(ok_response("Already processed"));
    }

    let Some(payment_intent) = invoice.payment_intent.clone() else {
        tracing::debug!(invoice_id = %invoice.id, "invoice without payment intent");
        txn.commit().await?;
        return Ok(ok_response("Ignored"));
    };

    let order = Orders::find()
        .filter(OrderCol::PaymentIntentId.eq(payment_intent.clone()))
        .one(&txn)
        .await?;

    let Some(order) = order else {
        tracing::info!(invoice_id = %invoice.id, %payment_intent, "no matching order for invoice");
        txn.commit().await?;
        return Ok(ok_response("No matching order"));
    };

    let Some(pdf_url) = invoice.invoice_pdf.clone() else {
        tracing::debug!(invoice_id = %invoice.id, "invoice has no pdf yet");
        txn.commit().await?;
        return Ok(ok_response("Ignored"));
    };

    let order_id = order.id;
    let mut active: OrderActive = order.into();
    active.invoice_pdf_url = Set(Some(pdf_url));
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(%order_id, invoice_id = %invoice.id, "invoice pdf linked to order");

    Ok(ApiResponse::success(
        "Invoice linked",
        serde_json::json!({ "order_id": order_id }),
        Some(Meta::empty()),
    ))
}

fn parse_session_metadata(session: &CheckoutSession) -> AppResult<(Uuid, Uuid, i32)> {
    let get = |key: &str| {
        session
            .metadata
            .get(key)
            .ok_or_else(|| AppError::BadRequest(format!("session metadata missing {key}")))
    };

    let user_id = Uuid::parse_str(get("user_id")?)
        .map_err(|_| AppError::BadRequest("invalid user_id in session metadata".into()))?;
    let antique_id = Uuid::parse_str(get("antique_id")?)
        .map_err(|_| AppError::BadRequest("invalid antique_id in session metadata".into()))?;
    let quantity = get("quantity")?
        .parse::<i32>()
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| AppError::BadRequest("invalid quantity in session metadata".into()))?;

    Ok((user_id, antique_id, quantity))
}

fn ok_response(message: &str) -> ApiResponse<Value> {
    ApiResponse::success(message, serde_json::json!({}), Some(Meta::empty()))
}
