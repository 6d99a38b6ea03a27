//! Provider adapter - single dispatch point over provider kinds

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{AppError, Result};
use crate::profile::Profile;
use crate::provider::traits::GenerationBackend;
use crate::provider::types::{GenerationRequest, GenerationResult, ImageRef};
use crate::provider::{openai, pollinations, ProviderKind};
use crate::response::base64;

/// HTTP-backed implementation of [`GenerationBackend`]
pub struct ProviderAdapter {
    client: Client,
    http: HttpConfig,
}

impl ProviderAdapter {
    /// Create a new adapter; timeouts are applied per request
    pub fn new(http: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, http })
    }
}

#[async_trait]
impl GenerationBackend for ProviderAdapter {
    async fn generate(&self, profile: &Profile, request: &GenerationRequest) -> Result<GenerationResult> {
        let timeout = self.http.generation_timeout();
        let result = match profile.kind {
            ProviderKind::Pollinations => {
                pollinations::generate(&self.client, profile, request, timeout).await
            }
            ProviderKind::OpenAiCompatible | ProviderKind::Navy | ProviderKind::Custom => {
                openai::generate(&self.client, profile, request, timeout).await
            }
        }?;

        debug!(
            provider = %profile.kind,
            model = %request.model,
            images = result.images.len(),
            "Generation call succeeded"
        );
        Ok(result)
    }

    async fn list_models(&self, profile: &Profile) -> Result<Vec<String>> {
        let timeout = self.http.probe_timeout();
        match profile.kind {
            ProviderKind::Pollinations => pollinations::list_models(&self.client, profile, timeout).await,
            ProviderKind::OpenAiCompatible | ProviderKind::Navy | ProviderKind::Custom => {
                openai::list_models(&self.client, profile, timeout).await
            }
        }
    }

    async fn validate(&self, profile: &Profile) -> Result<String> {
        match profile.kind {
            // Usable without credentials
            ProviderKind::Pollinations => Ok(format!("{} is ready", profile.kind.display_name())),
            ProviderKind::OpenAiCompatible | ProviderKind::Navy | ProviderKind::Custom => {
                let prefix = profile.kind.key_prefix();
                if let Some(key) = profile.credential() {
                    if !prefix.is_empty() && !key.starts_with(prefix) {
                        warn!(provider = %profile.kind, "API key does not carry the usual '{}' prefix", prefix);
                    }
                }
                let models = openai::list_models(&self.client, profile, self.http.probe_timeout()).await?;
                debug!(provider = %profile.kind, models = models.len(), "Credential check passed");
                Ok("API key verified".to_string())
            }
        }
    }

    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>> {
        if image.is_data_uri() {
            return base64::decode(image.as_str());
        }

        let response = self
            .client
            .get(image.as_str())
            .timeout(self.http.fetch_timeout())
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_status(status.as_u16(), text));
        }

        Ok(response.bytes().await.map_err(map_send_error)?.to_vec())
    }
}

/// Map a failed send into the error taxonomy; timeouts keep their own class
pub(crate) fn map_send_error(error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::Timeout(error.to_string())
    } else {
        AppError::HttpClient(error)
    }
}

/// Map a non-2xx provider response
pub(crate) fn error_from_status(status: u16, body: String) -> AppError {
    let message = if body.trim().is_empty() {
        "no response body".to_string()
    } else {
        body.trim().chars().take(500).collect()
    };

    match status {
        401 | 403 => AppError::AuthenticationFailed(format!("HTTP {}: {}", status, message)),
        _ => AppError::Api { status, message },
    }
}
