use lazy_static::lazy_static;
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::User;

use super::schema::{SlotMap, SLOT_KEYS};

#[derive(Debug, Clone, FromRow)]
pub struct Inventory {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    #[sqlx(flatten)]
    pub slots: SlotMap,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One row of the admin inventory listing.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryStats {
    pub id: Uuid,
    pub user_id: String,
    pub owner_email: String,
    pub name: String,
    pub is_public: bool,
    pub item_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl<'r> FromRow<'r, PgRow> for SlotMap {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let mut slots = SlotMap::default();
        for (i, key) in SLOT_KEYS.iter().enumerate() {
            let label: Option<String> = row.try_get(format!("{key}_label").as_str())?;
            let enabled: bool = row.try_get(format!("{key}_enabled").as_str())?;
            slots.set_raw(i, label, enabled);
        }
        Ok(slots)
    }
}

fn slot_columns() -> String {
    SLOT_KEYS
        .iter()
        .map(|k| format!("{k}_label, {k}_enabled"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholders(from: usize, count: usize) -> String {
    (from..from + count)
        .map(|n| format!("${n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

lazy_static! {
    static ref INVENTORY_COLUMNS: String = format!(
        "id, user_id, name, description, is_public, {}, created_at, updated_at",
        slot_columns()
    );
    static ref INSERT_SQL: String = format!(
        "INSERT INTO inventories (id, user_id, name, description, is_public, {cols}) \
         VALUES ($1, $2, $3, $4, $5, {vals}) \
         RETURNING {ret}",
        cols = slot_columns(),
        vals = placeholders(6, SLOT_KEYS.len() * 2),
        ret = *INVENTORY_COLUMNS,
    );
    static ref UPDATE_SQL: String = format!(
        "UPDATE inventories SET name = $2, description = $3, is_public = $4, {sets}, \
         updated_at = now() WHERE id = $1 RETURNING {ret}",
        sets = SLOT_KEYS
            .iter()
            .enumerate()
            .map(|(i, k)| format!("{k}_label = ${}, {k}_enabled = ${}", 5 + i * 2, 6 + i * 2))
            .collect::<Vec<_>>()
            .join(", "),
        ret = *INVENTORY_COLUMNS,
    );
}

impl Inventory {
    pub async fn create(
        db: &PgPool,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        is_public: bool,
        slots: &SlotMap,
    ) -> sqlx::Result<Inventory> {
        let mut query = sqlx::query_as::<_, Inventory>(&INSERT_SQL)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(name)
            .bind(description)
            .bind(is_public);
        for (label, enabled) in slots.pairs() {
            query = query.bind(label.clone()).bind(enabled);
        }
        query.fetch_one(db).await
    }

    pub async fn find(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Inventory>> {
        sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {} FROM inventories WHERE id = $1",
            *INVENTORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Inventory>> {
        sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {} FROM inventories WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            *INVENTORY_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Full-row update; the caller supplies the complete new state, so slots
    /// it wants untouched must carry the previous values.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        is_public: bool,
        slots: &SlotMap,
    ) -> sqlx::Result<Inventory> {
        let mut query = sqlx::query_as::<_, Inventory>(&UPDATE_SQL)
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(is_public);
        for (label, enabled) in slots.pairs() {
            query = query.bind(label.clone()).bind(enabled);
        }
        query.fetch_one(db).await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM inventories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// System-wide listing with per-inventory item counts, admin only.
    pub async fn list_all_with_stats(
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<InventoryStats>> {
        sqlx::query_as::<_, InventoryStats>(
            r#"
            SELECT inv.id, inv.user_id, u.email AS owner_email, inv.name,
                   inv.is_public, COUNT(it.id) AS item_count, inv.created_at
            FROM inventories inv
            JOIN users u ON u.id = inv.user_id
            LEFT JOIN items it ON it.inventory_id = inv.id
            GROUP BY inv.id, u.email
            ORDER BY inv.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Mutations are owner-only; admins get no write access.
    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.user_id == uid
    }

    /// Read access: owner, public inventory, or admin.
    pub fn can_read(&self, user: &User) -> bool {
        self.is_owned_by(&user.id) || self.is_public || user.is_admin
    }

    /// Fetches the inventory and asserts the requester owns it. Runs before
    /// every mutation of the inventory or its items.
    pub async fn fetch_owned(db: &PgPool, id: Uuid, uid: &str) -> Result<Inventory, AppError> {
        let inventory = Inventory::find(db, id)
            .await?
            .ok_or(AppError::NotFound("Inventory"))?;
        if !inventory.is_owned_by(uid) {
            return Err(AppError::Forbidden);
        }
        Ok(inventory)
    }

    pub async fn fetch_readable(
        db: &PgPool,
        id: Uuid,
        user: &User,
    ) -> Result<Inventory, AppError> {
        let inventory = Inventory::find(db, id)
            .await?
            .ok_or(AppError::NotFound("Inventory"))?;
        if !inventory.can_read(user) {
            return Err(AppError::Forbidden);
        }
        Ok(inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(owner: &str, is_public: bool) -> Inventory {
        let now = OffsetDateTime::now_utc();
        Inventory {
            id: Uuid::new_v4(),
            user_id: owner.into(),
            name: "cameras".into(),
            description: None,
            is_public,
            slots: SlotMap::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: &str, is_admin: bool) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: id.into(),
            email: format!("{id}@example.com"),
            is_admin,
            is_blocked: false,
            crm_contact_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_can_read_and_mutate() {
        let inv = inventory("uid-owner", false);
        let owner = user("uid-owner", false);
        assert!(inv.is_owned_by(&owner.id));
        assert!(inv.can_read(&owner));
    }

    #[test]
    fn stranger_gets_nothing_on_a_private_inventory() {
        let inv = inventory("uid-owner", false);
        let stranger = user("uid-other", false);
        assert!(!inv.is_owned_by(&stranger.id));
        assert!(!inv.can_read(&stranger));
    }

    #[test]
    fn public_inventory_is_readable_but_not_writable_by_strangers() {
        let inv = inventory("uid-owner", true);
        let stranger = user("uid-other", false);
        assert!(inv.can_read(&stranger));
        assert!(!inv.is_owned_by(&stranger.id));
    }

    #[test]
    fn admin_can_read_private_inventories_but_does_not_own_them() {
        let inv = inventory("uid-owner", false);
        let admin = user("uid-admin", true);
        assert!(inv.can_read(&admin));
        assert!(!inv.is_owned_by(&admin.id));
    }

    #[test]
    fn insert_sql_binds_every_slot_column() {
        // 5 metadata placeholders + 15 label/enabled pairs.
        assert!(INSERT_SQL.contains("$35"));
        assert!(!INSERT_SQL.contains("$36"));
        assert!(INSERT_SQL.contains("custom_link3_enabled"));
    }

    #[test]
    fn update_sql_sets_all_slots_and_touches_updated_at() {
        assert!(UPDATE_SQL.contains("custom_string1_label = $5"));
        assert!(UPDATE_SQL.contains("custom_link3_enabled = $34"));
        assert!(UPDATE_SQL.contains("updated_at = now()"));
    }
}
