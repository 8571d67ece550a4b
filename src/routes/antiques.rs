use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::antiques::{
        AntiqueList, AntiqueWithImages, CreateAntiqueRequest, DailyPicks, UpdateAntiqueRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::AntiqueQuery,
    services::antique_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_antiques))
        .route("/", post(create_antique))
        .route("/daily-picks", get(daily_picks))
        .route("/{id}", get(get_antique))
        .route("/{id}", put(update_antique))
        .route("/{id}", delete(delete_antique))
}

#[utoipa::path(
    get,
    path = "/api/antiques",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search in title and description"),
        ("type_of_antique" = Option<String>, Query, description = "Filter by category"),
        ("min_price" = Option<i64>, Query, description = "Minimum price in minor units"),
        ("max_price" = Option<i64>, Query, description = "Maximum price in minor units"),
    ),
    responses(
        (status = 200, description = "List antiques", body = ApiResponse<AntiqueList>)
    ),
    tag = "Antiques"
)]
pub async fn list_antiques(
    State(state): State<AppState>,
    Query(query): Query<AntiqueQuery>,
) -> AppResult<Json<ApiResponse<AntiqueList>>> {
    let resp = antique_service::list_antiques(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/antiques/daily-picks",
    responses(
        (status = 200, description = "Today's featured antiques", body = ApiResponse<DailyPicks>)
    ),
    tag = "Antiques"
)]
pub async fn daily_picks(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DailyPicks>>> {
    let resp = antique_service::daily_picks(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/antiques/{id}",
    params(("id" = Uuid, Path, description = "Antique ID")),
    responses(
        (status = 200, description = "Get antique", body = ApiResponse<AntiqueWithImages>),
        (status = 404, description = "Antique not found"),
    ),
    tag = "Antiques"
)]
pub async fn get_antique(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AntiqueWithImages>>> {
    let resp = antique_service::get_antique(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/antiques",
    request_body = CreateAntiqueRequest,
    responses(
        (status = 200, description = "Create antique", body = ApiResponse<AntiqueWithImages>)
    ),
    tag = "Antiques"
)]
pub async fn create_antique(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAntiqueRequest>,
) -> AppResult<Json<ApiResponse<AntiqueWithImages>>> {
    let resp = antique_service::create_antique(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/antiques/{id}",
    params(("id" = Uuid, Path, description = "Antique ID")),
    request_body = UpdateAntiqueRequest,
    responses(
        (status = 200, description = "Update antique", body = ApiResponse<AntiqueWithImages>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Antique not found"),
    ),
    tag = "Antiques"
)]
pub async fn update_antique(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAntiqueRequest>,
) -> AppResult<Json<ApiResponse<AntiqueWithImages>>> {
    let resp = antique_service::update_antique(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/antiques/{id}",
    params(("id" = Uuid, Path, description = "Antique ID")),
    responses(
        (status = 200, description = "Delete antique"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Antique not found"),
    ),
    tag = "Antiques"
)]
pub async fn delete_antique(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = antique_service::delete_antique(&state, &user, id).await?;
    Ok(Json(resp))
}
