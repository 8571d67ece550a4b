use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Antique, AntiqueImage};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAntiqueRequest {
    pub title: String,
    /// Optional explicit slug; generated from the title when absent.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub type_of_antique: String,
    pub dimensions: Option<String>,
    pub price: i64,
    pub quantity: i32,
    pub stripe_price_id: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAntiqueRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub type_of_antique: Option<String>,
    pub dimensions: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i32>,
    pub stripe_price_id: Option<String>,
    pub image_urls: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AntiqueWithImages {
    pub antique: Antique,
    pub images: Vec<AntiqueImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AntiqueList {
    pub items: Vec<Antique>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyPicks {
    pub pick_date: chrono::NaiveDate,
    pub antiques: Vec<Antique>,
}
