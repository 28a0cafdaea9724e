use axum::extract::FromRef;
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::debug;

use crate::{config::AuthConfig, state::AppState};

use super::claims::IdClaims;

/// Verifies ID tokens issued by the external identity provider.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(state: &AppState) -> Self {
        let AuthConfig {
            token_secret,
            issuer,
            audience,
        } = state.config.auth.clone();
        Self {
            decoding: DecodingKey::from_secret(token_secret.as_bytes()),
            issuer,
            audience,
        }
    }
}

impl TokenVerifier {
    pub fn verify(&self, token: &str) -> anyhow::Result<IdClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<IdClaims>(token, &self.decoding, &validation)?;
        debug!(uid = %data.claims.sub, "id token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    fn make_verifier(secret: &str, issuer: &str, audience: &str) -> TokenVerifier {
        TokenVerifier {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    fn issue_token(secret: &str, issuer: &str, audience: &str, ttl: Duration) -> String {
        let now = OffsetDateTime::now_utc();
        let claims = IdClaims {
            sub: "uid-123".into(),
            email: "user@example.com".into(),
            iat: now.unix_timestamp() as usize,
            exp: (now + ttl).unix_timestamp() as usize,
            iss: issuer.into(),
            aud: audience.into(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("sign token")
    }

    #[test]
    fn verifies_a_well_formed_token() {
        let verifier = make_verifier("dev-secret", "idp", "stockroom");
        let token = issue_token("dev-secret", "idp", "stockroom", Duration::minutes(5));
        let claims = verifier.verify(&token).expect("verify");
        assert_eq!(claims.sub, "uid-123");
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn rejects_wrong_secret() {
        let verifier = make_verifier("right-secret", "idp", "stockroom");
        let token = issue_token("wrong-secret", "idp", "stockroom", Duration::minutes(5));
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn rejects_wrong_issuer_or_audience() {
        let verifier = make_verifier("dev-secret", "good-iss", "good-aud");
        let token = issue_token("dev-secret", "bad-iss", "bad-aud", Duration::minutes(5));
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = make_verifier("dev-secret", "idp", "stockroom");
        let token = issue_token("dev-secret", "idp", "stockroom", Duration::minutes(-10));
        assert!(verifier.verify(&token).is_err());
    }
}
