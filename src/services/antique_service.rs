use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::antiques::{
        AntiqueList, AntiqueWithImages, CreateAntiqueRequest, DailyPicks as DailyPicksData,
        UpdateAntiqueRequest,
    },
    entity::{
        antique_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as AntiqueImages,
            Model as ImageModel,
        },
        antiques::{
            ActiveModel as AntiqueActive, Column, Entity as Antiques, Model as AntiqueModel,
        },
        daily_pick_items::{
            ActiveModel as PickItemActive, Column as PickItemCol, Entity as DailyPickItems,
        },
        daily_picks::{ActiveModel as PickActive, Column as PickCol, Entity as DailyPicks},
        sellers::{Column as SellerCol, Entity as Sellers},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Antique, AntiqueImage},
    response::{ApiResponse, Meta},
    routes::params::{AntiqueQuery, AntiqueSortBy, SortOrder},
    state::AppState,
};

pub async fn list_antiques(
    state: &AppState,
    query: AntiqueQuery,
) -> AppResult<ApiResponse<AntiqueList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(kind) = query.type_of_antique.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::TypeOfAntique.eq(kind.clone()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(AntiqueSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        AntiqueSortBy::CreatedAt => Column::CreatedAt,
        AntiqueSortBy::Price => Column::Price,
        AntiqueSortBy::Title => Column::Title,
    };

    let mut finder = Antiques::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(antique_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Antiques", AntiqueList { items }, Some(meta)))
}

/// Today's featured listings. The first request of the day creates the
/// date row and fills it with up to three random antiques; every later
/// request returns the same set. Concurrent first requests converge on the
/// committed rows via do-nothing upserts on the unique keys.
pub async fn daily_picks(state: &AppState) -> AppResult<ApiResponse<DailyPicksData>> {
    let today = Utc::now().date_naive();

    let pick = match DailyPicks::find()
        .filter(PickCol::PickDate.eq(today))
        .one(&state.orm)
        .await?
    {
        Some(pick) => pick,
        None => {
            DailyPicks::insert(PickActive {
                id: Set(Uuid::new_v4()),
                pick_date: Set(today),
                created_at: NotSet,
            })
            .on_conflict(OnConflict::column(PickCol::PickDate).do_nothing().to_owned())
            .exec_without_returning(&state.orm)
            .await?;
            DailyPicks::find()
                .filter(PickCol::PickDate.eq(today))
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?
        }
    };

    let mut chosen_ids: Vec<Uuid> = DailyPickItems::find()
        .filter(PickItemCol::DailyPickId.eq(pick.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|item| item.antique_id)
        .collect();

    if chosen_ids.is_empty() {
        let chosen = Antiques::find()
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .limit(3)
            .all(&state.orm)
            .await?;
        for antique in &chosen {
            DailyPickItems::insert(PickItemActive {
                id: Set(Uuid::new_v4()),
                daily_pick_id: Set(pick.id),
                antique_id: Set(antique.id),
            })
            .on_conflict(
                OnConflict::columns([PickItemCol::DailyPickId, PickItemCol::AntiqueId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&state.orm)
            .await?;
        }
        chosen_ids = DailyPickItems::find()
            .filter(PickItemCol::DailyPickId.eq(pick.id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|item| item.antique_id)
            .collect();
    }

    let antiques = if chosen_ids.is_empty() {
        Vec::new()
    } else {
        Antiques::find()
            .filter(Column::Id.is_in(chosen_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(antique_from_entity)
            .collect()
    };

    Ok(ApiResponse::success(
        "Daily picks",
        DailyPicksData {
            pick_date: today,
            antiques,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_antique(state: &AppState, id: Uuid) -> AppResult<ApiResponse<AntiqueWithImages>> {
    let antique = Antiques::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let images = AntiqueImages::find()
        .filter(ImageCol::AntiqueId.eq(antique.id))
        .order_by_asc(ImageCol::Position)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(image_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Antique",
        AntiqueWithImages {
            antique: antique_from_entity(antique),
            images,
        },
        None,
    ))
}

pub async fn create_antique(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAntiqueRequest,
) -> AppResult<ApiResponse<AntiqueWithImages>> {
    if payload.quantity < 0 {
        return Err(AppError::BadRequest("Quantity cannot be negative".into()));
    }

    let seller = Sellers::find()
        .filter(SellerCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let slug = match payload.slug.as_ref().filter(|s| !s.is_empty()) {
        Some(explicit) => explicit.clone(),
        None => unique_slug(state, &payload.title).await?,
    };

    let id = Uuid::new_v4();
    let active = AntiqueActive {
        id: Set(id),
        seller_id: Set(seller.map(|s| s.id)),
        title: Set(payload.title),
        slug: Set(slug),
        description: Set(payload.description),
        type_of_antique: Set(payload.type_of_antique),
        dimensions: Set(payload.dimensions),
        price: Set(payload.price),
        quantity: Set(payload.quantity),
        stripe_price_id: Set(payload.stripe_price_id),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let antique = active.insert(&state.orm).await?;

    let images = replace_images(state, antique.id, &payload.image_urls).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "antique_create",
        Some("antiques"),
        Some(serde_json::json!({ "antique_id": antique.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Antique created",
        AntiqueWithImages {
            antique: antique_from_entity(antique),
            images,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_antique(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAntiqueRequest,
) -> AppResult<ApiResponse<AntiqueWithImages>> {
    let antique = Antiques::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    ensure_owner(state, user, &antique).await?;

    let mut active: AntiqueActive = antique.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(kind) = payload.type_of_antique {
        active.type_of_antique = Set(kind);
    }
    if let Some(dimensions) = payload.dimensions {
        active.dimensions = Set(Some(dimensions));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(quantity) = payload.quantity {
        if quantity < 0 {
            return Err(AppError::BadRequest("Quantity cannot be negative".into()));
        }
        active.quantity = Set(quantity);
    }
    if let Some(price_id) = payload.stripe_price_id {
        active.stripe_price_id = Set(Some(price_id));
    }
    active.updated_at = Set(Utc::now().into());
    let antique = active.update(&state.orm).await?;

    let images = match payload.image_urls {
        Some(urls) => replace_images(state, antique.id, &urls).await?,
        None => AntiqueImages::find()
            .filter(ImageCol::AntiqueId.eq(antique.id))
            .order_by_asc(ImageCol::Position)
            .all(&state.orm)
            .await?
            .into_iter()
            .map(image_from_entity)
            .collect(),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "antique_update",
        Some("antiques"),
        Some(serde_json::json!({ "antique_id": antique.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Antique updated",
        AntiqueWithImages {
            antique: antique_from_entity(antique),
            images,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_antique(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let antique = Antiques::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    ensure_owner(state, user, &antique).await?;

    Antiques::delete_by_id(antique.id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "antique_delete",
        Some("antiques"),
        Some(serde_json::json!({ "antique_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Antique deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_owner(
    state: &AppState,
    user: &AuthUser,
    antique: &AntiqueModel,
) -> AppResult<()> {
    if user.role == "admin" {
        return Ok(());
    }
    let Some(seller_id) = antique.seller_id else {
        return Err(AppError::Forbidden);
    };
    let seller = Sellers::find_by_id(seller_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Forbidden)?;
    if seller.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

async fn replace_images(
    state: &AppState,
    antique_id: Uuid,
    urls: &[String],
) -> AppResult<Vec<AntiqueImage>> {
    AntiqueImages::delete_many()
        .filter(ImageCol::AntiqueId.eq(antique_id))
        .exec(&state.orm)
        .await?;

    let mut images = Vec::with_capacity(urls.len());
    for (position, url) in urls.iter().enumerate() {
        let image = ImageActive {
            id: Set(Uuid::new_v4()),
            antique_id: Set(antique_id),
            image_url: Set(url.clone()),
            position: Set(position as i32),
        }
        .insert(&state.orm)
        .await?;
        images.push(image_from_entity(image));
    }
    Ok(images)
}

/// Slug from the title, with a numeric suffix on collision.
async fn unique_slug(state: &AppState, title: &str) -> AppResult<String> {
    let base = slugify(title);
    let mut candidate = base.clone();
    let mut counter = 1;
    loop {
        let taken = Antiques::find()
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

pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

pub(crate) fn antique_from_entity(model: AntiqueModel) -> Antique {
    Antique {
        id: model.id,
        seller_id: model.seller_id,
        title: model.title,
        slug: model.slug,
        description: model.description,
        type_of_antique: model.type_of_antique,
        dimensions: model.dimensions,
        price: model.price,
        quantity: model.quantity,
        stripe_price_id: model.stripe_price_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn image_from_entity(model: ImageModel) -> AntiqueImage {
    AntiqueImage {
        id: model.id,
        antique_id: model.antique_id,
        image_url: model.image_url,
        position: model.position,
    }
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Victorian Oak Dresser"), "victorian-oak-dresser");
        assert_eq!(slugify("  Art Déco!! Lamp  "), "art-d-co-lamp");
        assert_eq!(slugify("???"), "untitled");
    }
}
