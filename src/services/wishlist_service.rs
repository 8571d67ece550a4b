use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::wishlists::{
        AddWishlistItemRequest, CreateWishlistRequest, WishlistList, WishlistWithAntiques,
    },
    entity::{
        antiques::Entity as Antiques,
        wishlist_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as WishlistItems,
        },
        wishlists::{
            ActiveModel as WishlistActive, Column, Entity as Wishlists, Model as WishlistModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Wishlist,
    response::{ApiResponse, Meta},
    services::antique_service::antique_from_entity,
    state::AppState,
};

pub async fn create_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: CreateWishlistRequest,
) -> AppResult<ApiResponse<Wishlist>> {
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".into()));
    }

    let wishlist = WishlistActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        title: Set(payload.title),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Wishlist created",
        wishlist_from_entity(wishlist),
        Some(Meta::empty()),
    ))
}

pub async fn list_wishlists(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<WishlistList>> {
    let items = Wishlists::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(wishlist_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Wishlists",
        WishlistList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_wishlist(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<WishlistWithAntiques>> {
    let wishlist = find_own_wishlist(state, user, id).await?;

    let antique_ids: Vec<Uuid> = WishlistItems::find()
        .filter(ItemCol::WishlistId.eq(wishlist.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|item| item.antique_id)
        .collect();

    let antiques = if antique_ids.is_empty() {
        Vec::new()
    } else {
        Antiques::find()
            .filter(crate::entity::antiques::Column::Id.is_in(antique_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(antique_from_entity)
            .collect()
    };

    Ok(ApiResponse::success(
        "Wishlist",
        WishlistWithAntiques {
            wishlist: wishlist_from_entity(wishlist),
            antiques,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_wishlist(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let wishlist = find_own_wishlist(state, user, id).await?;
    Wishlists::delete_by_id(wishlist.id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Wishlist deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    wishlist_id: Uuid,
    payload: AddWishlistItemRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let wishlist = find_own_wishlist(state, user, wishlist_id).await?;

    let antique = Antiques::find_by_id(payload.antique_id)
        .one(&state.orm)
        .await?;
    if antique.is_none() {
        return Err(AppError::BadRequest("Antique not found".into()));
    }

    let existing = WishlistItems::find()
        .filter(
            Condition::all()
                .add(ItemCol::WishlistId.eq(wishlist.id))
                .add(ItemCol::AntiqueId.eq(payload.antique_id)),
        )
        .one(&state.orm)
        .await?;

    if existing.is_none() {
        ItemActive {
            id: Set(Uuid::new_v4()),
            wishlist_id: Set(wishlist.id),
            antique_id: Set(payload.antique_id),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "wishlist_add",
        Some("wishlists"),
        Some(serde_json::json!({ "wishlist_id": wishlist.id, "antique_id": payload.antique_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    wishlist_id: Uuid,
    antique_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let wishlist = find_own_wishlist(state, user, wishlist_id).await?;

    let result = WishlistItems::delete_many()
        .filter(
            Condition::all()
                .add(ItemCol::WishlistId.eq(wishlist.id))
                .add(ItemCol::AntiqueId.eq(antique_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_own_wishlist(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<WishlistModel> {
    let wishlist = Wishlists::find()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?;
    wishlist.ok_or(AppError::NotFound)
}

fn wishlist_from_entity(model: WishlistModel) -> Wishlist {
    Wishlist {
        id: model.id,
        user_id: model.user_id,
        title: model.title,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
