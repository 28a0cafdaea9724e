use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub crm_contact_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

const USER_COLUMNS: &str =
    "id, email, is_admin, is_blocked, crm_contact_id, created_at, updated_at";

impl User {
    /// Insert-or-refresh on every authenticated request. The very first row
    /// ever inserted gets the admin flag.
    pub async fn upsert_on_auth(db: &PgPool, uid: &str, email: &str) -> sqlx::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, is_admin)
            VALUES ($1, $2, NOT EXISTS (SELECT 1 FROM users))
            ON CONFLICT (id) DO UPDATE
                SET email = EXCLUDED.email, updated_at = now()
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(uid)
        .bind(email)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Admin mutation; a `None` leaves the corresponding flag untouched.
    pub async fn set_flags(
        db: &PgPool,
        uid: &str,
        is_admin: Option<bool>,
        is_blocked: Option<bool>,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET is_admin = COALESCE($2, is_admin),
                is_blocked = COALESCE($3, is_blocked),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(uid)
        .bind(is_admin)
        .bind(is_blocked)
        .fetch_optional(db)
        .await
    }

    pub async fn set_crm_contact(
        db: &PgPool,
        uid: &str,
        contact_id: &str,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"UPDATE users SET crm_contact_id = $2, updated_at = now() WHERE id = $1"#,
        )
        .bind(uid)
        .bind(contact_id)
        .execute(db)
        .await?;
        Ok(())
    }
}
