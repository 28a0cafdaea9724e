pub mod client;
pub mod pkce;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{auth::AuthUser, config::CrmConfig, error::AppError, state::AppState, users::User};

use client::CrmClient;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/crm/authorize", get(authorize))
        .route("/crm/link", post(link))
}

fn crm_config(state: &AppState) -> Result<&CrmConfig, AppError> {
    state
        .config
        .crm
        .as_ref()
        .ok_or_else(|| AppError::Crm("CRM integration is not configured".into()))
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub authorization_url: String,
    pub state: String,
    pub code_verifier: String,
}

/// Starts the PKCE flow. The client holds on to `state` and `code_verifier`
/// and sends the verifier back on completion; nothing is stored server-side.
#[instrument(skip(state, user), fields(uid = %user.id))]
pub async fn authorize(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<AuthorizeResponse>, AppError> {
    let config = crm_config(&state)?;
    let pkce = pkce::generate();
    let oauth_state = pkce::random_state();
    let client = CrmClient::new(&state.http, config);
    let authorization_url = client.authorization_url(&oauth_state, &pkce.challenge)?;
    Ok(Json(AuthorizeResponse {
        authorization_url,
        state: oauth_state,
        code_verifier: pkce.verifier,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub code: String,
    pub code_verifier: String,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub contact_id: String,
}

/// OAuth completion: exchanges the code, creates the mirrored contact record
/// carrying the user's email, and persists the contact id on the profile.
#[instrument(skip(state, user, body), fields(uid = %user.id))]
pub async fn link(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    if body.code.is_empty() || body.code_verifier.is_empty() {
        return Err(AppError::BadRequest(
            "code and code_verifier are required".into(),
        ));
    }
    let config = crm_config(&state)?;
    let client = CrmClient::new(&state.http, config);

    let token = client
        .exchange_code(&body.code, &body.code_verifier)
        .await?;
    let contact_id = client.create_contact(&token.access_token, &user.email).await?;
    User::set_crm_contact(&state.db, &user.id, &contact_id).await?;

    info!(contact_id = %contact_id, "crm contact linked");
    Ok(Json(LinkResponse { contact_id }))
}
