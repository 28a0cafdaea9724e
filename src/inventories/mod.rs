pub mod dto;
pub mod handlers;
pub mod repo;
pub mod schema;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/inventories",
            get(handlers::list_inventories).post(handlers::create_inventory),
        )
        .route(
            "/inventories/:id",
            get(handlers::get_inventory)
                .put(handlers::update_inventory)
                .delete(handlers::delete_inventory),
        )
}
