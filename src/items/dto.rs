use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Item;

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub inventory_id: Uuid,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub inventory_id: Uuid,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

impl ListItemsQuery {
    /// Same bounds as the inventory listing; see `Pagination::clamped`.
    pub fn clamped(&self) -> (i64, i64) {
        (
            self.limit.clamp(1, crate::inventories::dto::MAX_LIMIT),
            self.offset.max(0),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub data: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            inventory_id: item.inventory_id,
            data: item.data,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}
