use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::AppError,
    items::{dto::ItemResponse, repo::Item},
    state::AppState,
};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 50;

pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<i64>,
}

/// Treats `%`, `_` and `\` in the user query as literal characters.
fn escape_like(q: &str) -> String {
    q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

async fn search_items(
    db: &PgPool,
    uid: &str,
    q: &str,
    limit: i64,
) -> sqlx::Result<Vec<Item>> {
    sqlx::query_as::<_, Item>(
        r#"
        SELECT it.id, it.inventory_id, it.data, it.search_text, it.created_at, it.updated_at
        FROM items it
        JOIN inventories inv ON inv.id = it.inventory_id
        WHERE inv.user_id = $1 AND it.search_text LIKE '%' || $2 || '%'
        ORDER BY it.created_at DESC
        LIMIT $3
        "#,
    )
    .bind(uid)
    .bind(escape_like(&q.to_lowercase()))
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Substring search over each item's precomputed search text, scoped to the
/// requesting user's own items.
#[instrument(skip(state, user), fields(uid = %user.id))]
pub async fn search(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::BadRequest("q is required".into()));
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let items = search_items(&state.db, &user.id, query.q.trim(), limit).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain words"), "plain words");
    }

    #[test]
    fn limit_clamps_to_bounds() {
        assert_eq!(9000i64.clamp(1, MAX_LIMIT), 50);
        assert_eq!((-3i64).clamp(1, MAX_LIMIT), 1);
    }
}
