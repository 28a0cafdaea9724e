use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Inventory;
use super::schema::{FieldInput, SchemaField};

#[derive(Debug, Deserialize)]
pub struct CreateInventoryRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub fields: Vec<FieldInput>,
}

/// Partial update; omitted parts keep their current state. A present
/// `fields` replaces the whole schema; an explicit `"description": null`
/// clears the description (distinguished from omission by the double
/// `Option`).
#[derive(Debug, Deserialize)]
pub struct UpdateInventoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub fields: Option<Vec<FieldInput>>,
}

/// Wraps any present value (including `null`) in `Some`; an absent field
/// falls back to the `None` default.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub fields: Vec<SchemaField>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Inventory> for InventoryResponse {
    fn from(inv: Inventory) -> Self {
        let fields = inv.slots.schema();
        Self {
            id: inv.id,
            user_id: inv.user_id,
            name: inv.name,
            description: inv.description,
            is_public: inv.is_public,
            fields,
            created_at: inv.created_at,
            updated_at: inv.updated_at,
        }
    }
}

pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// Bounds the caller-supplied values; negative numbers would otherwise
    /// reach `LIMIT`/`OFFSET` and surface as a database error.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_LIMIT), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_null_from_omission() {
        let omitted: UpdateInventoryRequest =
            serde_json::from_str(r#"{"name": "tools"}"#).unwrap();
        assert_eq!(omitted.description, None);

        let cleared: UpdateInventoryRequest =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateInventoryRequest =
            serde_json::from_str(r#"{"description": "garage shelf"}"#).unwrap();
        assert_eq!(set.description, Some(Some("garage shelf".into())));
    }

    #[test]
    fn pagination_clamps_negative_and_oversized_values() {
        let p = Pagination {
            limit: -1,
            offset: -10,
        };
        assert_eq!(p.clamped(), (1, 0));

        let p = Pagination {
            limit: 9000,
            offset: 5,
        };
        assert_eq!(p.clamped(), (MAX_LIMIT, 5));
    }

    #[test]
    fn pagination_defaults_apply_when_absent() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.clamped(), (20, 0));
    }
}
