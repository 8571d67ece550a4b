use crate::{
    db::DbPool,
    dto::newsletter::SubscribeRequest,
    error::{AppError, AppResult},
    models::Subscriber,
    response::{ApiResponse, Meta},
};
use uuid::Uuid;

pub async fn subscribe(
    pool: &DbPool,
    payload: SubscribeRequest,
) -> AppResult<ApiResponse<Subscriber>> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') || email.len() < 3 {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }

    // Idempotent on email: re-subscribing returns the existing row.
    let existing: Option<Subscriber> =
        sqlx::query_as("SELECT * FROM subscribers WHERE email = $1")
            .bind(&email)
            .fetch_optional(pool)
            .await?;

    let subscriber = match existing {
        Some(sub) => sub,
        None => {
            sqlx::query_as::<_, Subscriber>(
                "INSERT INTO subscribers (id, email) VALUES ($1, $2) RETURNING *",
            )
            .bind(Uuid::new_v4())
            .bind(&email)
            .fetch_one(pool)
            .await?
        }
    };

    Ok(ApiResponse::success(
        "Subscribed",
        subscriber,
        Some(Meta::empty()),
    ))
}

pub async fn unsubscribe(
    pool: &DbPool,
    payload: SubscribeRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = payload.email.trim().to_lowercase();

    let result = sqlx::query("DELETE FROM subscribers WHERE email = $1")
        .bind(&email)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Unsubscribed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
