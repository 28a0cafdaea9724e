use serde::Deserialize;
use tracing::debug;

use crate::config::CrmConfig;
use crate::error::AppError;

/// Thin client for the CRM's OAuth token endpoint and contact API.
pub struct CrmClient<'a> {
    http: &'a reqwest::Client,
    config: &'a CrmConfig,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
struct ContactResponse {
    id: String,
}

impl<'a> CrmClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a CrmConfig) -> Self {
        Self { http, config }
    }

    /// Authorization URL the client redirects the user to.
    pub fn authorization_url(
        &self,
        state: &str,
        code_challenge: &str,
    ) -> Result<String, AppError> {
        let mut url = reqwest::Url::parse(&self.config.authorize_url)
            .map_err(|e| AppError::Crm(format!("authorize url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url.to_string())
    }

    /// Exchanges an authorization code plus PKCE verifier for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, AppError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
            ("code_verifier", code_verifier),
        ];
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Crm(format!("token request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Crm(format!("token endpoint returned {status}")));
        }
        let token = resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| AppError::Crm(format!("token response: {e}")))?;
        debug!("crm code exchanged");
        Ok(token)
    }

    /// Creates the mirrored contact record, returning its id.
    pub async fn create_contact(
        &self,
        access_token: &str,
        email: &str,
    ) -> Result<String, AppError> {
        let resp = self
            .http
            .post(format!("{}/contacts", self.config.api_base))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(|e| AppError::Crm(format!("contact request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Crm(format!("contact endpoint returned {status}")));
        }
        let contact = resp
            .json::<ContactResponse>()
            .await
            .map_err(|e| AppError::Crm(format!("contact response: {e}")))?;
        debug!(contact_id = %contact.id, "crm contact created");
        Ok(contact.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CrmConfig {
        CrmConfig {
            client_id: "client-1".into(),
            client_secret: None,
            authorize_url: "https://crm.example.com/oauth/authorize".into(),
            token_url: "https://crm.example.com/oauth/token".into(),
            api_base: "https://crm.example.com/api".into(),
            redirect_uri: "https://app.example.com/crm/callback".into(),
        }
    }

    #[test]
    fn authorization_url_carries_pkce_params() {
        let http = reqwest::Client::new();
        let config = config();
        let client = CrmClient::new(&http, &config);
        let url = client
            .authorization_url("state-xyz", "challenge-abc")
            .unwrap();
        assert!(url.starts_with("https://crm.example.com/oauth/authorize?"));
        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("state=state-xyz"));
        assert!(url.contains("code_challenge=challenge-abc"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcrm%2Fcallback"));
    }
}
