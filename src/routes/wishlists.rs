use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::wishlists::{
        AddWishlistItemRequest, CreateWishlistRequest, WishlistList, WishlistWithAntiques,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Wishlist,
    response::ApiResponse,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlists))
        .route("/", post(create_wishlist))
        .route("/{id}", get(get_wishlist))
        .route("/{id}", delete(delete_wishlist))
        .route("/{id}/items", post(add_item))
        .route("/{id}/items/{antique_id}", delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/wishlists",
    responses(
        (status = 200, description = "List own wishlists", body = ApiResponse<WishlistList>)
    ),
    tag = "Wishlists"
)]
pub async fn list_wishlists(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<WishlistList>>> {
    let resp = wishlist_service::list_wishlists(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlists",
    request_body = CreateWishlistRequest,
    responses(
        (status = 200, description = "Create wishlist", body = ApiResponse<Wishlist>)
    ),
    tag = "Wishlists"
)]
pub async fn create_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateWishlistRequest>,
) -> AppResult<Json<ApiResponse<Wishlist>>> {
    let resp = wishlist_service::create_wishlist(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/wishlists/{id}",
    params(("id" = Uuid, Path, description = "Wishlist ID")),
    responses(
        (status = 200, description = "Get wishlist with antiques", body = ApiResponse<WishlistWithAntiques>),
        (status = 404, description = "Wishlist not found"),
    ),
    tag = "Wishlists"
)]
pub async fn get_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistWithAntiques>>> {
    let resp = wishlist_service::get_wishlist(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlists/{id}",
    params(("id" = Uuid, Path, description = "Wishlist ID")),
    responses(
        (status = 200, description = "Delete wishlist"),
        (status = 404, description = "Wishlist not found"),
    ),
    tag = "Wishlists"
)]
pub async fn delete_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::delete_wishlist(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlists/{id}/items",
    params(("id" = Uuid, Path, description = "Wishlist ID")),
    request_body = AddWishlistItemRequest,
    responses(
        (status = 200, description = "Add antique to wishlist"),
        (status = 404, description = "Wishlist not found"),
    ),
    tag = "Wishlists"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddWishlistItemRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::add_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlists/{id}/items/{antique_id}",
    params(
        ("id" = Uuid, Path, description = "Wishlist ID"),
        ("antique_id" = Uuid, Path, description = "Antique ID"),
    ),
    responses(
        (status = 200, description = "Remove antique from wishlist"),
        (status = 404, description = "Wishlist or item not found"),
    ),
    tag = "Wishlists"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, antique_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::remove_item(&state, &user, id, antique_id).await?;
    Ok(Json(resp))
}
