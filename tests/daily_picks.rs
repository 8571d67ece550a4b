mod common;

use common::*;

use antiques_market_api::services::antique_service;
use std::collections::HashSet;
use uuid::Uuid;

// The first request of the day fills the pick set; later requests return
// the same antiques instead of re-rolling.
#[tokio::test]
async fn daily_picks_are_stable_within_a_day() -> anyhow::Result<()> {
    let Some(database_url) = test_database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url, "http://stripe.invalid").await?;

    create_antique(&state, 1, None).await?;
    create_antique(&state, 1, None).await?;

    let first = antique_service::daily_picks(&state).await?;
    let first = first.data.unwrap();
    assert!(!first.antiques.is_empty());
    assert!(first.antiques.len() <= 3);

    let second = antique_service::daily_picks(&state).await?;
    let second = second.data.unwrap();

    let first_ids: HashSet<Uuid> = first.antiques.iter().map(|a| a.id).collect();
    let second_ids: HashSet<Uuid> = second.antiques.iter().map(|a| a.id).collect();
    assert_eq!(first_ids, second_ids);
    assert_eq!(first.pick_date, second.pick_date);

    Ok(())
}
