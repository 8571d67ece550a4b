#![allow(dead_code)]

use antiques_market_api::{
    db::{create_orm_conn, create_pool},
    entity::{antiques::ActiveModel as AntiqueActive, users::ActiveModel as UserActive},
    state::AppState,
    stripe::{EventKind, StripeClient, StripeConfig, WebhookEvent},
};
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::Set;
use uuid::Uuid;

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";

/// Tests that need Postgres skip themselves when no database is configured.
pub fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

pub async fn setup_state(database_url: &str, stripe_api_base: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let stripe = StripeClient::new(StripeConfig {
        secret_key: "sk_test_xxx".to_string(),
        webhook_secret: WEBHOOK_SECRET.to_string(),
        api_base: stripe_api_base.to_string(),
    });

    Ok(AppState {
        pool,
        orm,
        stripe,
        base_url: "http://localhost:3000".to_string(),
    })
}

/// Seed a user with a unique email so runs never collide.
pub async fn create_user(state: &AppState, prefix: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        email: Set(format!("{prefix}-{id}@example.com")),
        password_hash: Set("x".to_string()),
        role: Set("user".to_string()),
        stripe_customer_id: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(id)
}

pub async fn create_antique(
    state: &AppState,
    quantity: i32,
    stripe_price_id: Option<&str>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    create_antique_with_id(state, id, quantity, stripe_price_id).await?;
    Ok(id)
}

/// Seed an antique under a caller-chosen id, for tests that reference the
/// listing before it exists.
pub async fn create_antique_with_id(
    state: &AppState,
    id: Uuid,
    quantity: i32,
    stripe_price_id: Option<&str>,
) -> anyhow::Result<Uuid> {
    AntiqueActive {
        id: Set(id),
        seller_id: Set(None),
        title: Set("Georgian Writing Desk".to_string()),
        slug: Set(format!("georgian-writing-desk-{id}")),
        description: Set(Some("Mahogany, circa 1820".to_string())),
        type_of_antique: Set("furniture".to_string()),
        dimensions: Set(None),
        price: Set(125_000),
        quantity: Set(quantity),
        stripe_price_id: Set(stripe_price_id.map(|s| s.to_string())),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(id)
}

pub fn checkout_completed_event(
    event_id: &str,
    session_id: &str,
    user_id: Uuid,
    antique_id: Uuid,
    quantity: i32,
    payment_intent: Option<&str>,
) -> WebhookEvent {
    WebhookEvent {
        id: event_id.to_string(),
        event_type: "checkout.session.completed".to_string(),
        kind: EventKind::CheckoutSessionCompleted,
        object: serde_json::json!({
            "id": session_id,
            "payment_intent": payment_intent,
            "metadata": {
                "user_id": user_id.to_string(),
                "antique_id": antique_id.to_string(),
                "quantity": quantity.to_string(),
            }
        }),
    }
}

pub fn invoice_event(event_id: &str, payment_intent: Option<&str>, pdf_url: Option<&str>) -> WebhookEvent {
    WebhookEvent {
        id: event_id.to_string(),
        event_type: "invoice.finalized".to_string(),
        kind: EventKind::InvoiceFinalized,
        object: serde_json::json!({
            "id": format!("in_{event_id}"),
            "payment_intent": payment_intent,
            "invoice_pdf": pdf_url,
        }),
    }
}

pub async fn count_orders(state: &AppState, user_id: Uuid) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(count)
}

pub async fn antique_quantity(state: &AppState, antique_id: Uuid) -> anyhow::Result<i32> {
    let quantity: i32 = sqlx::query_scalar("SELECT quantity FROM antiques WHERE id = $1")
        .bind(antique_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(quantity)
}
