use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::sellers::UpsertSellerRequest,
    entity::sellers::{ActiveModel as SellerActive, Column, Entity as Sellers, Model as SellerModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Seller,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Create or update the caller's seller profile (one per user).
pub async fn upsert_my_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpsertSellerRequest,
) -> AppResult<ApiResponse<Seller>> {
    if payload.shop_name.trim().is_empty() {
        return Err(AppError::BadRequest("Shop name is required".into()));
    }

    let existing = Sellers::find()
        .filter(Column::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let seller = match existing {
        Some(seller) => {
            let mut active: SellerActive = seller.into();
            active.shop_name = Set(payload.shop_name);
            active.bio = Set(payload.bio);
            active.update(&state.orm).await?
        }
        None => {
            SellerActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                shop_name: Set(payload.shop_name),
                bio: Set(payload.bio),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "seller_upsert",
        Some("sellers"),
        Some(serde_json::json!({ "seller_id": seller.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Seller profile saved",
        seller_from_entity(seller),
        Some(Meta::empty()),
    ))
}

pub async fn get_seller(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Seller>> {
    let seller = Sellers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Seller",
        seller_from_entity(seller),
        None,
    ))
}

fn seller_from_entity(model: SellerModel) -> Seller {
    Seller {
        id: model.id,
        user_id: model.user_id,
        shop_name: model.shop_name,
        bio: model.bio,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
