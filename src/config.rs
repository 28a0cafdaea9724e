use serde::Deserialize;

/// Settings for verifying ID tokens issued by the external identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub token_secret: String,
    pub issuer: String,
    pub audience: String,
}

/// OAuth settings for the external CRM. Absent when the integration is not
/// configured for this deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub authorize_url: String,
    pub token_url: String,
    pub api_base: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
    pub crm: Option<CrmConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            token_secret: std::env::var("AUTH_TOKEN_SECRET")?,
            issuer: std::env::var("AUTH_TOKEN_ISSUER")
                .unwrap_or_else(|_| "stockroom-idp".into()),
            audience: std::env::var("AUTH_TOKEN_AUDIENCE")
                .unwrap_or_else(|_| "stockroom".into()),
        };
        let crm = match std::env::var("CRM_CLIENT_ID") {
            Ok(client_id) => Some(CrmConfig {
                client_id,
                client_secret: std::env::var("CRM_CLIENT_SECRET").ok(),
                authorize_url: std::env::var("CRM_AUTHORIZE_URL")?,
                token_url: std::env::var("CRM_TOKEN_URL")?,
                api_base: std::env::var("CRM_API_BASE")?,
                redirect_uri: std::env::var("CRM_REDIRECT_URI")?,
            }),
            Err(_) => None,
        };
        Ok(Self {
            database_url,
            auth,
            crm,
        })
    }
}
