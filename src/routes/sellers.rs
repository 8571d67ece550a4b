use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::sellers::UpsertSellerRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Seller,
    response::ApiResponse,
    services::seller_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", put(upsert_my_profile))
        .route("/{id}", get(get_seller))
}

#[utoipa::path(
    put,
    path = "/api/sellers/me",
    request_body = UpsertSellerRequest,
    responses(
        (status = 200, description = "Create or update own seller profile", body = ApiResponse<Seller>)
    ),
    tag = "Sellers"
)]
pub async fn upsert_my_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpsertSellerRequest>,
) -> AppResult<Json<ApiResponse<Seller>>> {
    let resp = seller_service::upsert_my_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sellers/{id}",
    params(("id" = Uuid, Path, description = "Seller ID")),
    responses(
        (status = 200, description = "Get seller", body = ApiResponse<Seller>),
        (status = 404, description = "Seller not found"),
    ),
    tag = "Sellers"
)]
pub async fn get_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Seller>>> {
    let resp = seller_service::get_seller(&state, id).await?;
    Ok(Json(resp))
}
