use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    auth::AdminUser,
    error::AppError,
    inventories::dto::Pagination,
    inventories::repo::{Inventory, InventoryStats},
    state::AppState,
    users::User,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", axum::routing::patch(update_user))
        .route("/inventories", get(list_inventories))
}

#[instrument(skip(state, admin), fields(uid = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<User>>, AppError> {
    let (limit, offset) = p.clamped();
    let users = User::list(&state.db, limit, offset).await?;
    Ok(Json(users))
}

/// Grant/revoke admin and block/unblock; absent flags stay untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub is_admin: Option<bool>,
    pub is_blocked: Option<bool>,
}

#[instrument(skip(state, admin, body), fields(uid = %admin.id))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    if body.is_admin.is_none() && body.is_blocked.is_none() {
        return Err(AppError::BadRequest(
            "is_admin or is_blocked is required".into(),
        ));
    }
    let user = User::set_flags(&state.db, &id, body.is_admin, body.is_blocked)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(
        target_uid = %user.id,
        is_admin = user.is_admin,
        is_blocked = user.is_blocked,
        "user flags updated"
    );
    Ok(Json(user))
}

#[instrument(skip(state, admin), fields(uid = %admin.id))]
pub async fn list_inventories(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<InventoryStats>>, AppError> {
    let (limit, offset) = p.clamped();
    let stats = Inventory::list_all_with_stats(&state.db, limit, offset).await?;
    Ok(Json(stats))
}
