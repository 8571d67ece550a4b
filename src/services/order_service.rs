//! Checkout initiation, order reads and the synchronous invoice fallback.
//!
//! Checkout creates no local rows: buyer, listing and quantity ride along as
//! Stripe session metadata and the order is recorded only when the completed
//! webhook arrives (see `webhook_service`). Abandoned checkouts therefore
//! leave nothing behind.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        CheckoutRequest, CheckoutStarted, InvoiceDownload, OrderList, OrderWithItems,
        PortalStarted,
    },
    entity::{
        antiques::Entity as Antiques,
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        order_items::{
            Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel,
        },
        users::{ActiveModel as UserActive, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
    stripe::CheckoutSessionParams,
};
use chrono::Utc;

pub async fn start_checkout(
    state: &AppState,
    user: &AuthUser,
    antique_id: Uuid,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutStarted>> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let antique = Antiques::find_by_id(antique_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    // Availability is checked here and re-checked under a row lock when the
    // completed-session webhook lands.
    if antique.quantity < quantity {
        return Err(AppError::BadRequest("Not enough stock".into()));
    }

    let price_id = antique
        .stripe_price_id
        .clone()
        .ok_or_else(|| AppError::BadRequest("Listing is not purchasable yet".into()))?;

    let buyer = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let customer_id = ensure_stripe_customer(state, buyer).await?;

    let params = CheckoutSessionParams {
        customer: customer_id,
        price_id,
        quantity,
        success_url: format!("{}/checkout-result?success=true", state.base_url),
        cancel_url: format!("{}/checkout-result?canceled=true", state.base_url),
        metadata: vec![
            ("user_id".to_string(), user.user_id.to_string()),
            ("antique_id".to_string(), antique.id.to_string()),
            ("quantity".to_string(), quantity.to_string()),
        ],
    };

    let session = state.stripe.create_checkout_session(&params).await?;
    let checkout_url = session
        .url
        .clone()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("checkout session has no url")))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout_started",
        Some("orders"),
        Some(serde_json::json!({ "antique_id": antique.id, "session_id": session.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout session created",
        CheckoutStarted {
            session_id: session.id,
            checkout_url,
        },
        Some(Meta::empty()),
    ))
}

/// Provision a Stripe customer on first use, persisting the id on the user.
/// Guarded by a presence check only; a concurrent first checkout can create
/// a spare provider customer, which Stripe tolerates.
async fn ensure_stripe_customer(state: &AppState, buyer: UserModel) -> AppResult<String> {
    if let Some(existing) = buyer.stripe_customer_id.clone() {
        return Ok(existing);
    }

    let customer = state
        .stripe
        .create_customer(&buyer.email, None)
        .await?;

    let mut active: UserActive = buyer.into();
    active.stripe_customer_id = Set(Some(customer.id.clone()));
    active.update(&state.orm).await?;

    Ok(customer.id)
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_own_order(state, user, id).await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Read-through cache for the receipt PDF. A cached URL is returned without
/// touching Stripe; otherwise the lookup chain runs once and the result is
/// stored on the order. No expiry, no invalidation.
pub async fn download_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<InvoiceDownload>> {
    let order = find_own_order(state, user, id).await?;

    if let Some(url) = order.invoice_pdf_url.clone() {
        return Ok(ApiResponse::success(
            "Invoice",
            InvoiceDownload {
                invoice_pdf_url: url,
            },
            Some(Meta::empty()),
        ));
    }

    let url = match fetch_invoice_pdf(state, &order).await {
        Ok(Some(url)) => url,
        Ok(None) => {
            return Err(AppError::BadRequest("Invoice not available yet".into()));
        }
        Err(err) => {
            tracing::warn!(order_id = %order.id, error = %err, "invoice lookup failed");
            return Err(AppError::BadRequest("Invoice not available yet".into()));
        }
    };

    let order_id = order.id;
    let mut active: OrderActive = order.into();
    active.invoice_pdf_url = Set(Some(url.clone()));
    active.update(&state.orm).await?;

    tracing::info!(order_id = %order_id, "invoice pdf cached");

    Ok(ApiResponse::success(
        "Invoice",
        InvoiceDownload {
            invoice_pdf_url: url,
        },
        Some(Meta::empty()),
    ))
}

async fn fetch_invoice_pdf(
    state: &AppState,
    order: &OrderModel,
) -> Result<Option<String>, crate::stripe::StripeError> {
    // Orders created by the webhook carry the payment intent; fall back to a
    // session lookup for rows that predate that column.
    let payment_intent = match order.payment_intent_id.clone() {
        Some(pi) => Some(pi),
        None => match order.stripe_session_id.as_deref() {
            Some(session_id) => {
                let session = state.stripe.retrieve_checkout_session(session_id).await?;
                session.payment_intent
            }
            None => None,
        },
    };

    let Some(payment_intent) = payment_intent else {
        return Ok(None);
    };

    let invoices = state.stripe.list_invoices(&payment_intent).await?;
    Ok(invoices.into_iter().find_map(|inv| inv.invoice_pdf))
}

pub async fn billing_portal(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PortalStarted>> {
    let buyer = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let customer_id = buyer
        .stripe_customer_id
        .ok_or_else(|| AppError::BadRequest("No billing profile yet".into()))?;

    let portal = state
        .stripe
        .create_portal_session(&customer_id, &state.base_url)
        .await?;

    Ok(ApiResponse::success(
        "Portal session created",
        PortalStarted {
            portal_url: portal.url,
        },
        Some(Meta::empty()),
    ))
}

async fn find_own_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderModel> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    order.ok_or(AppError::NotFound)
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        stripe_session_id: model.stripe_session_id,
        payment_intent_id: model.payment_intent_id,
        status: model.status,
        invoice_pdf_url: model.invoice_pdf_url,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        antique_id: model.antique_id,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
