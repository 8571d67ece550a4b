use axum::{
    Json, Router,
    extract::State,
    routing::{delete, post},
};

use crate::{
    dto::newsletter::SubscribeRequest,
    error::AppResult,
    models::Subscriber,
    response::ApiResponse,
    services::newsletter_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/subscribe", delete(unsubscribe))
}

#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribe to the newsletter", body = ApiResponse<Subscriber>),
        (status = 400, description = "Invalid email"),
    ),
    tag = "Newsletter"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<Json<ApiResponse<Subscriber>>> {
    let resp = newsletter_service::subscribe(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Unsubscribe from the newsletter"),
        (status = 404, description = "Email not subscribed"),
    ),
    tag = "Newsletter"
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = newsletter_service::unsubscribe(&state.pool, payload).await?;
    Ok(Json(resp))
}
