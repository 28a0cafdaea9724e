mod repo;

pub use repo::User;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{auth::AuthUser, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
    pub crm_contact_id: Option<String>,
}

#[instrument(skip_all, fields(uid = %user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        email: user.email,
        is_admin: user.is_admin,
        crm_contact_id: user.crm_contact_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn me_response_serialization() {
        let response = MeResponse {
            id: "uid-1".into(),
            email: "test@example.com".into(),
            is_admin: false,
            crm_contact_id: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"is_admin\":false"));
    }
}
