use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertSellerRequest {
    pub shop_name: String,
    pub bio: Option<String>,
}
