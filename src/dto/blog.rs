use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::BlogPost;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBlogPostRequest {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBlogPostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogPostList {
    pub items: Vec<BlogPost>,
}
