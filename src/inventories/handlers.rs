use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, error::AppError, state::AppState};

use super::dto::{CreateInventoryRequest, InventoryResponse, Pagination, UpdateInventoryRequest};
use super::repo::Inventory;
use super::schema::SlotMap;

#[instrument(skip(state, user), fields(uid = %user.id))]
pub async fn list_inventories(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<InventoryResponse>>, AppError> {
    let (limit, offset) = p.clamped();
    let inventories = Inventory::list_by_user(&state.db, &user.id, limit, offset).await?;
    Ok(Json(inventories.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, user, body), fields(uid = %user.id))]
pub async fn create_inventory(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CreateInventoryRequest>,
) -> Result<(StatusCode, Json<InventoryResponse>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    let slots = SlotMap::from_fields(&body.fields);
    let inventory = Inventory::create(
        &state.db,
        &user.id,
        body.name.trim(),
        body.description.as_deref(),
        body.is_public,
        &slots,
    )
    .await?;
    info!(inventory_id = %inventory.id, "inventory created");
    Ok((StatusCode::CREATED, Json(inventory.into())))
}

#[instrument(skip(state, user), fields(uid = %user.id))]
pub async fn get_inventory(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryResponse>, AppError> {
    let inventory = Inventory::fetch_readable(&state.db, id, &user).await?;
    Ok(Json(inventory.into()))
}

#[instrument(skip(state, user, body), fields(uid = %user.id))]
pub async fn update_inventory(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInventoryRequest>,
) -> Result<Json<InventoryResponse>, AppError> {
    // Ownership check first; the update reuses the fetched row for any part
    // the caller left out.
    let current = Inventory::fetch_owned(&state.db, id, &user.id).await?;

    let name = body.name.unwrap_or(current.name);
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    // Some(None) is an explicit null and clears the description.
    let description = match body.description {
        Some(d) => d,
        None => current.description,
    };
    let is_public = body.is_public.unwrap_or(current.is_public);
    let slots = match &body.fields {
        Some(fields) => SlotMap::from_fields(fields),
        None => current.slots,
    };

    let inventory = Inventory::update(
        &state.db,
        id,
        name.trim(),
        description.as_deref(),
        is_public,
        &slots,
    )
    .await?;
    info!(inventory_id = %inventory.id, "inventory updated");
    Ok(Json(inventory.into()))
}

#[instrument(skip(state, user), fields(uid = %user.id))]
pub async fn delete_inventory(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    Inventory::fetch_owned(&state.db, id, &user.id).await?;
    if !Inventory::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Inventory"));
    }
    info!(inventory_id = %id, "inventory deleted");
    Ok(StatusCode::NO_CONTENT)
}
