use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, error::AppError, inventories::repo::Inventory, state::AppState};

use super::dto::{CreateItemRequest, ItemResponse, ListItemsQuery, UpdateItemRequest};
use super::repo::Item;

fn require_object(data: &serde_json::Value) -> Result<(), AppError> {
    if !data.is_object() {
        return Err(AppError::BadRequest("data must be a JSON object".into()));
    }
    Ok(())
}

#[instrument(skip(state, user), fields(uid = %user.id))]
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<ListItemsQuery>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    Inventory::fetch_readable(&state.db, q.inventory_id, &user).await?;
    let (limit, offset) = q.clamped();
    let items = Item::list_by_inventory(&state.db, q.inventory_id, limit, offset).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, user, body), fields(uid = %user.id))]
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), AppError> {
    require_object(&body.data)?;
    Inventory::fetch_owned(&state.db, body.inventory_id, &user.id).await?;
    let item = Item::create(&state.db, body.inventory_id, &body.data).await?;
    info!(item_id = %item.id, inventory_id = %item.inventory_id, "item created");
    Ok((StatusCode::CREATED, Json(item.into())))
}

#[instrument(skip(state, user), fields(uid = %user.id))]
pub async fn get_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = Item::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Item"))?;
    Inventory::fetch_readable(&state.db, item.inventory_id, &user).await?;
    Ok(Json(item.into()))
}

#[instrument(skip(state, user, body), fields(uid = %user.id))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, AppError> {
    require_object(&body.data)?;
    let item = Item::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Item"))?;
    Inventory::fetch_owned(&state.db, item.inventory_id, &user.id).await?;
    let item = Item::update_data(&state.db, id, &body.data).await?;
    info!(item_id = %item.id, "item updated");
    Ok(Json(item.into()))
}

#[instrument(skip(state, user), fields(uid = %user.id))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let item = Item::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Item"))?;
    Inventory::fetch_owned(&state.db, item.inventory_id, &user.id).await?;
    if !Item::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Item"));
    }
    info!(item_id = %id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}
