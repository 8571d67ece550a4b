mod common;

use common::*;

use antiques_market_api::{
    dto::orders::CheckoutRequest, error::AppError, middleware::auth::AuthUser,
    services::order_service,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// First checkout provisions a Stripe customer and persists its id; the
// second reuses it, so the customers endpoint is hit exactly once.
#[tokio::test]
async fn checkout_provisions_customer_once_and_returns_hosted_url() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cus_test_1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(body_string_contains("mode=payment"))
        .and(body_string_contains("line_items%5B0%5D%5Bprice%5D=price_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cs_test_1",
            "url": "https://checkout.stripe.com/pay/cs_test_1",
            "customer": "cus_test_1",
            "metadata": {}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let state = setup_state(&database_url, &server.uri()).await?;
    let user_id = create_user(&state, "shopper").await?;
    let antique_id = create_antique(&state, 4, Some("price_123")).await?;
    let auth = AuthUser {
        user_id,
        role: "user".into(),
    };

    let resp = order_service::start_checkout(
        &state,
        &auth,
        antique_id,
        CheckoutRequest { quantity: Some(2) },
    )
    .await?;
    let started = resp.data.unwrap();
    assert_eq!(started.session_id, "cs_test_1");
    assert_eq!(started.checkout_url, "https://checkout.stripe.com/pay/cs_test_1");

    let customer: Option<String> =
        sqlx::query_scalar("SELECT stripe_customer_id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(customer.as_deref(), Some("cus_test_1"));

    // Second checkout: customer already provisioned.
    order_service::start_checkout(&state, &auth, antique_id, CheckoutRequest { quantity: None })
        .await?;

    // No local order rows exist until the webhook confirms payment.
    assert_eq!(count_orders(&state, user_id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn checkout_rejects_insufficient_stock() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };

    let state = setup_state(&database_url, "http://stripe.invalid").await?;
    let user_id = create_user(&state, "shopper").await?;
    let antique_id = create_antique(&state, 1, Some("price_123")).await?;
    let auth = AuthUser {
        user_id,
        role: "user".into(),
    };

    let result = order_service::start_checkout(
        &state,
        &auth,
        antique_id,
        CheckoutRequest { quantity: Some(3) },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn checkout_rejects_listing_without_price() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };

    let state = setup_state(&database_url, "http://stripe.invalid").await?;
    let user_id = create_user(&state, "shopper").await?;
    let antique_id = create_antique(&state, 5, None).await?;
    let auth = AuthUser {
        user_id,
        role: "user".into(),
    };

    let result = order_service::start_checkout(
        &state,
        &auth,
        antique_id,
        CheckoutRequest::default(),
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}
