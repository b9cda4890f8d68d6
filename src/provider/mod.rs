use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Verified claims delivered by the external identity provider. The
/// verifier has already checked the credential's authenticity; `subject`
/// and `email` may still be empty when the provider omitted them, and the
/// identity resolver treats that as a hard sign-in failure.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub full_name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The credential itself is invalid, expired, or for another audience.
    #[error("credential rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered with a server error.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// External identity-provider seam: turn an opaque credential into a
/// verified profile. The OAuth handshake itself lives on the other side of
/// this trait.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<ProviderProfile, ProviderError>;
}

/// Verifies Google ID tokens against the tokeninfo endpoint.
/// Docs: https://developers.google.com/identity/sign-in/web/backend-auth
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: Option<String>,
}

impl GoogleVerifier {
    pub const PROVIDER: &'static str = "google";

    const TOKENINFO_URL: &'static str = "https://oauth2.googleapis.com/tokeninfo";

    pub fn new(http: reqwest::Client, client_id: Option<String>) -> Self {
        Self { http, client_id }
    }

    pub fn from_env() -> Self {
        Self::new(
            reqwest::Client::new(),
            std::env::var("GOOGLE_OAUTH_CLIENT_ID").ok(),
        )
    }
}

#[async_trait]
impl IdentityProvider for GoogleVerifier {
    async fn verify(&self, credential: &str) -> Result<ProviderProfile, ProviderError> {
        let url = format!("{}?id_token={}", Self::TOKENINFO_URL, credential);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // 4xx means Google looked at the token and said no; anything
            // else is Google being unreachable or broken.
            if status.is_client_error() {
                warn!("Google tokeninfo rejected credential with status {}", status);
                return Err(ProviderError::Rejected(format!(
                    "tokeninfo returned {}",
                    status
                )));
            }
            return Err(ProviderError::Unavailable(format!(
                "tokeninfo returned {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Rejected(format!("malformed tokeninfo body: {}", e)))?;

        // tokeninfo validates the signature; expiry and audience are still
        // ours to check. exp arrives as a string-encoded unix timestamp.
        let exp = body.get("exp").and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_str().and_then(|s| s.parse::<i64>().ok()))
        });
        if let Some(exp) = exp {
            if exp < Utc::now().timestamp() {
                return Err(ProviderError::Rejected("token has expired".to_string()));
            }
        }

        if let Some(client_id) = &self.client_id {
            match body.get("aud").and_then(|v| v.as_str()) {
                Some(aud) if aud == client_id => {}
                Some(_) => {
                    return Err(ProviderError::Rejected("token audience mismatch".to_string()))
                }
                None => {
                    return Err(ProviderError::Rejected("token missing audience".to_string()))
                }
            }
        }

        let field = |name: &str| {
            body.get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let profile = ProviderProfile {
            provider: Self::PROVIDER.to_string(),
            subject: field("sub").unwrap_or_default(),
            email: field("email").unwrap_or_default(),
            given_name: field("given_name"),
            family_name: field("family_name"),
            full_name: field("name"),
            picture: field("picture"),
        };

        debug!(
            "Google credential verified for subject '{}'",
            profile.subject
        );

        Ok(profile)
    }
}
