pub mod claims;
pub mod verifier;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{error::AppError, state::AppState, users::User};

use verifier::TokenVerifier;

/// Authenticated requester. Verifies the bearer ID token and upserts the
/// user row, so a user record exists from the first authenticated request.
pub struct AuthUser(pub User);

/// Authenticated requester with the admin flag set.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid auth scheme".into()))?;

        let claims = TokenVerifier::from_ref(state).verify(token).map_err(|_| {
            warn!("invalid or expired id token");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        let user = User::upsert_on_auth(&state.db, &claims.sub, &claims.email).await?;

        if user.is_blocked {
            warn!(uid = %user.id, "blocked user rejected");
            return Err(AppError::Forbidden);
        }

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            warn!(uid = %user.id, "non-admin hit admin route");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
