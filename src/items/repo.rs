use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::inventories::schema::SLOT_KEYS;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub data: serde_json::Value,
    #[serde(skip_serializing)]
    pub search_text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

const ITEM_COLUMNS: &str = "id, inventory_id, data, search_text, created_at, updated_at";

/// Lowercase concatenation of the document's values in fixed slot order.
/// Recomputed on every write; the stored document itself stays opaque.
pub fn derive_search_text(data: &serde_json::Value) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(doc) = data.as_object() {
        for key in SLOT_KEYS.iter() {
            match doc.get(key) {
                Some(serde_json::Value::String(s)) => parts.push(s.clone()),
                Some(serde_json::Value::Number(n)) => parts.push(n.to_string()),
                Some(serde_json::Value::Bool(b)) => parts.push(b.to_string()),
                _ => {}
            }
        }
    }
    parts.join(" ").to_lowercase()
}

impl Item {
    pub async fn create(
        db: &PgPool,
        inventory_id: Uuid,
        data: &serde_json::Value,
    ) -> sqlx::Result<Item> {
        sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (id, inventory_id, data, search_text)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(inventory_id)
        .bind(data)
        .bind(derive_search_text(data))
        .fetch_one(db)
        .await
    }

    pub async fn find(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Item>> {
        sqlx::query_as::<_, Item>(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_by_inventory(
        db: &PgPool,
        inventory_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Item>> {
        sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE inventory_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(inventory_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn update_data(
        db: &PgPool,
        id: Uuid,
        data: &serde_json::Value,
    ) -> sqlx::Result<Item> {
        sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET data = $2, search_text = $3, updated_at = now()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data)
        .bind(derive_search_text(data))
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_text_lowercases_and_joins_in_slot_order() {
        let data = json!({
            "custom_link1": "https://Example.COM",
            "custom_string1": "Vintage Camera",
            "custom_number2": 42,
            "custom_boolean1": true,
        });
        assert_eq!(
            derive_search_text(&data),
            "vintage camera 42 true https://example.com"
        );
    }

    #[test]
    fn search_text_skips_nulls_and_unknown_keys() {
        let data = json!({
            "custom_string1": null,
            "not_a_slot": "ignored",
            "custom_text2": "Some Notes",
        });
        assert_eq!(derive_search_text(&data), "some notes");
    }

    #[test]
    fn search_text_of_non_object_is_empty() {
        assert_eq!(derive_search_text(&json!("just a string")), "");
        assert_eq!(derive_search_text(&json!(null)), "");
    }
}
