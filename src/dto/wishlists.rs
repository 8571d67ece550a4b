use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Antique, Wishlist};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWishlistRequest {
    pub title: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddWishlistItemRequest {
    pub antique_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistList {
    pub items: Vec<Wishlist>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistWithAntiques {
    pub wishlist: Wishlist,
    pub antiques: Vec<Antique>,
}
