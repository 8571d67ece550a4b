use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::blog::{BlogPostList, CreateBlogPostRequest, UpdateBlogPostRequest},
    entity::blog_posts::{
        ActiveModel as PostActive, Column, Entity as BlogPosts, Model as PostModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::BlogPost,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::antique_service::slugify,
    state::AppState,
};

const WORDS_PER_MINUTE: i64 = 200;

pub async fn list_posts(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<BlogPostList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = BlogPosts::find()
        .filter(Column::Published.eq(true))
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(post_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Posts", BlogPostList { items }, Some(meta)))
}

pub async fn get_post_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<BlogPost>> {
    let post = BlogPosts::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::Published.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Post", post_from_entity(post), None))
}

pub async fn create_post(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBlogPostRequest,
) -> AppResult<ApiResponse<BlogPost>> {
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".into()));
    }

    let slug = match payload.slug.as_ref().filter(|s| !s.is_empty()) {
        Some(explicit) => explicit.clone(),
        None => unique_slug(state, &payload.title).await?,
    };

    let post = PostActive {
        id: Set(Uuid::new_v4()),
        author_id: Set(user.user_id),
        title: Set(payload.title),
        slug: Set(slug),
        content: Set(payload.content),
        published: Set(payload.published),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "blog_post_create",
        Some("blog_posts"),
        Some(serde_json::json!({ "post_id": post.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Post created",
        post_from_entity(post),
        Some(Meta::empty()),
    ))
}

pub async fn update_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBlogPostRequest,
) -> AppResult<ApiResponse<BlogPost>> {
    let post = BlogPosts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if post.author_id != user.user_id {
        ensure_admin(user)?;
    }

    let mut active: PostActive = post.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(published) = payload.published {
        active.published = Set(published);
    }
    active.updated_at = Set(Utc::now().into());
    let post = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Post updated",
        post_from_entity(post),
        Some(Meta::empty()),
    ))
}

pub async fn delete_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let post = BlogPosts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if post.author_id != user.user_id {
        ensure_admin(user)?;
    }

    BlogPosts::delete_by_id(post.id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Post deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn unique_slug(state: &AppState, title: &str) -> AppResult<String> {
    let base = slugify(title);
    let mut candidate = base.clone();
    let mut counter = 1;
    loop {
        let taken = BlogPosts::find()
            .filter(Column::Slug.eq(candidate.clone()))
            .one(&state.orm)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
}

fn post_from_entity(model: PostModel) -> BlogPost {
    let words = model.content.split_whitespace().count() as i64;
    let reading_time_minutes = (words / WORDS_PER_MINUTE).max(1);
    BlogPost {
        id: model.id,
        author_id: model.author_id,
        title: model.title,
        slug: model.slug,
        content: model.content,
        published: model.published,
        reading_time_minutes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
