mod common;

use common::*;

use antiques_market_api::{error::AppError, services::webhook_service};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

fn event_id() -> String {
    format!("evt_{}", Uuid::new_v4().simple())
}

// Completed checkout: exactly one order + item, stock down by the ordered
// quantity; replaying the same event id changes nothing.
#[tokio::test]
async fn checkout_completed_is_recorded_once() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    let user_id = create_user(&state, "buyer").await?;
    let antique_id = create_antique(&state, 10, Some("price_123")).await?;

    let evt = event_id();
    let event = checkout_completed_event(&evt, "cs_once", user_id, antique_id, 2, Some("pi_once"));
    webhook_service::handle_event(&state, event).await?;

    assert_eq!(count_orders(&state, user_id).await?, 1);
    assert_eq!(antique_quantity(&state, antique_id).await?, 8);

    let (status, payment_intent): (String, Option<String>) = sqlx::query_as(
        "SELECT status, payment_intent_id FROM orders WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(status, "paid");
    assert_eq!(payment_intent.as_deref(), Some("pi_once"));

    let item_count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM order_items oi JOIN orders o ON o.id = oi.order_id WHERE o.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(item_count, 1);

    // Replay with the identical event id.
    let replay = checkout_completed_event(&evt, "cs_once", user_id, antique_id, 2, Some("pi_once"));
    webhook_service::handle_event(&state, replay).await?;

    assert_eq!(count_orders(&state, user_id).await?, 1);
    assert_eq!(antique_quantity(&state, antique_id).await?, 8);

    Ok(())
}

#[tokio::test]
async fn stock_decrement_is_floor_clamped() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    let user_id = create_user(&state, "buyer").await?;
    let antique_id = create_antique(&state, 1, Some("price_123")).await?;

    let event =
        checkout_completed_event(&event_id(), "cs_clamp", user_id, antique_id, 2, Some("pi_clamp"));
    webhook_service::handle_event(&state, event).await?;

    assert_eq!(antique_quantity(&state, antique_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn vanished_listing_is_not_found_and_writes_nothing() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    let user_id = create_user(&state, "buyer").await?;
    let missing_antique = Uuid::new_v4();

    let event = checkout_completed_event(
        &event_id(),
        "cs_gone",
        user_id,
        missing_antique,
        1,
        Some("pi_gone"),
    );
    let result = webhook_service::handle_event(&state, event).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert_eq!(count_orders(&state, user_id).await?, 0);

    Ok(())
}

// A delivery that fails must not consume the event id: the provider's
// retry of the same event has to get a clean run and record the sale.
#[tokio::test]
async fn failed_delivery_is_retryable_under_same_event_id() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    let user_id = create_user(&state, "buyer").await?;
    let antique_id = Uuid::new_v4();

    let evt = event_id();
    let event =
        checkout_completed_event(&evt, "cs_retry", user_id, antique_id, 1, Some("pi_retry"));
    let result = webhook_service::handle_event(&state, event).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert_eq!(count_orders(&state, user_id).await?, 0);

    // The listing appears, and Stripe redelivers the identical event id.
    create_antique_with_id(&state, antique_id, 5, Some("price_123")).await?;
    let retry =
        checkout_completed_event(&evt, "cs_retry", user_id, antique_id, 1, Some("pi_retry"));
    webhook_service::handle_event(&state, retry).await?;

    assert_eq!(count_orders(&state, user_id).await?, 1);
    assert_eq!(antique_quantity(&state, antique_id).await?, 4);

    Ok(())
}

#[tokio::test]
async fn vanished_buyer_is_not_found_and_stays_retryable() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    let missing_user = Uuid::new_v4();
    let antique_id = create_antique(&state, 5, Some("price_123")).await?;

    let evt = event_id();
    let event =
        checkout_completed_event(&evt, "cs_nobuyer", missing_user, antique_id, 1, Some("pi_nb"));
    let result = webhook_service::handle_event(&state, event).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert_eq!(antique_quantity(&state, antique_id).await?, 5);

    // Redelivery must hit the same error, not a stale idempotency claim.
    let retry =
        checkout_completed_event(&evt, "cs_nobuyer", missing_user, antique_id, 1, Some("pi_nb"));
    let result = webhook_service::handle_event(&state, retry).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert_eq!(antique_quantity(&state, antique_id).await?, 5);

    Ok(())
}

#[tokio::test]
async fn invoice_event_links_pdf_by_payment_intent() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    let user_id = create_user(&state, "buyer").await?;
    let antique_id = create_antique(&state, 3, Some("price_123")).await?;

    let pi = format!("pi_{}", Uuid::new_v4().simple());
    let event =
        checkout_completed_event(&event_id(), "cs_inv", user_id, antique_id, 1, Some(&pi));
    webhook_service::handle_event(&state, event).await?;

    // An invoice for an unknown payment intent leaves the order untouched.
    let miss = invoice_event(&event_id(), Some("pi_unknown"), Some("https://stripe.test/miss.pdf"));
    webhook_service::handle_event(&state, miss).await?;
    let pdf: Option<String> =
        sqlx::query_scalar("SELECT invoice_pdf_url FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(pdf, None);

    // A matching payment intent attaches the PDF.
    let hit = invoice_event(&event_id(), Some(&pi), Some("https://stripe.test/receipt.pdf"));
    webhook_service::handle_event(&state, hit).await?;
    let pdf: Option<String> =
        sqlx::query_scalar("SELECT invoice_pdf_url FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(pdf.as_deref(), Some("https://stripe.test/receipt.pdf"));

    Ok(())
}

#[tokio::test]
async fn bad_signature_is_rejected_without_side_effects() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    let user_id = create_user(&state, "buyer").await?;
    let antique_id = create_antique(&state, 5, Some("price_123")).await?;

    let payload = serde_json::json!({
        "id": event_id(),
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_forged",
            "metadata": {
                "user_id": user_id.to_string(),
                "antique_id": antique_id.to_string(),
                "quantity": "1",
            }
        }}
    })
    .to_string();

    // Sign with the wrong secret; the format is valid but the MAC is not.
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(b"whsec_wrong").unwrap();
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let header = format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()));

    let result = webhook_service::handle_webhook(&state, payload.as_bytes(), &header).await;
    assert!(matches!(result, Err(AppError::Webhook(_))));
    assert_eq!(count_orders(&state, user_id).await?, 0);
    assert_eq!(antique_quantity(&state, antique_id).await?, 5);

    Ok(())
}

#[tokio::test]
async fn unrecognized_event_is_acknowledged_and_ignored() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    let event = antiques_market_api::stripe::WebhookEvent {
        id: event_id(),
        event_type: "customer.subscription.deleted".to_string(),
        kind: antiques_market_api::stripe::EventKind::Unrecognized,
        object: serde_json::json!({}),
    };
    let resp = webhook_service::handle_event(&state, event).await?;
    assert_eq!(resp.message, "Ignored");

    Ok(())
}
