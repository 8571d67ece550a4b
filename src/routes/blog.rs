use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::blog::{BlogPostList, CreateBlogPostRequest, UpdateBlogPostRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::BlogPost,
    response::ApiResponse,
    routes::params::Pagination,
    services::blog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/", post(create_post))
        // Reads address posts by slug; writes address them by id.
        .route("/{key}", get(get_post).put(update_post).delete(delete_post))
}

#[utoipa::path(
    get,
    path = "/api/blog",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List published posts", body = ApiResponse<BlogPostList>)
    ),
    tag = "Blog"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<BlogPostList>>> {
    let resp = blog_service::list_posts(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Get post", body = ApiResponse<BlogPost>),
        (status = 404, description = "Post not found"),
    ),
    tag = "Blog"
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = blog_service::get_post_by_slug(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blog",
    request_body = CreateBlogPostRequest,
    responses(
        (status = 200, description = "Create post", body = ApiResponse<BlogPost>)
    ),
    tag = "Blog"
)]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBlogPostRequest>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = blog_service::create_post(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdateBlogPostRequest,
    responses(
        (status = 200, description = "Update post", body = ApiResponse<BlogPost>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
    ),
    tag = "Blog"
)]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlogPostRequest>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = blog_service::update_post(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Delete post"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
    ),
    tag = "Blog"
)]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = blog_service::delete_post(&state, &user, id).await?;
    Ok(Json(resp))
}
