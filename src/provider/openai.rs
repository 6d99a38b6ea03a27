//! OpenAI-compatible images API (OpenAI, Navy, custom endpoints)

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::profile::Profile;
use crate::provider::adapter::{error_from_status, map_send_error};
use crate::provider::types::{GenerationRequest, GenerationResult, ImageRef};
use crate::response::base64;

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: String,
    n: u32,
    size: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelData>,
}

#[derive(Debug, Deserialize)]
struct ModelData {
    id: String,
}

fn api_key(profile: &Profile) -> Result<&str> {
    profile.credential().ok_or_else(|| {
        AppError::AuthenticationFailed(format!(
            "An API key is required for {}",
            profile.kind.display_name()
        ))
    })
}

/// `POST {base}/images/generations`; the provider's image list is adopted as is
pub(crate) async fn generate(
    client: &Client,
    profile: &Profile,
    request: &GenerationRequest,
    timeout: Duration,
) -> Result<GenerationResult> {
    let key = api_key(profile)?;
    let url = format!("{}/images/generations", profile.endpoint());

    let body = ImagesRequest {
        model: &request.model,
        prompt: request.effective_prompt(),
        n: request.count,
        size: request.geometry.as_size(),
    };

    debug!(provider = %profile.kind, url = %url, n = request.count, "Sending images request");

    let response = client
        .post(&url)
        .bearer_auth(key)
        .timeout(timeout)
        .json(&body)
        .send()
        .await
        .map_err(map_send_error)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(error_from_status(status.as_u16(), text));
    }

    let parsed: ImagesResponse = response
        .json()
        .await
        .map_err(|e| AppError::Api {
            status: status.as_u16(),
            message: format!("Failed to parse images response: {}", e),
        })?;

    let images: Vec<ImageRef> = parsed
        .data
        .into_iter()
        .filter_map(|image| match (image.url, image.b64_json) {
            (Some(url), _) => Some(ImageRef::url(url)),
            (None, Some(b64)) => Some(ImageRef(base64::wrap_base64(&b64, "image/png"))),
            (None, None) => None,
        })
        .collect();

    if images.is_empty() {
        return Err(AppError::Api {
            status: status.as_u16(),
            message: "Provider returned no images".to_string(),
        });
    }

    Ok(GenerationResult { images })
}

/// `GET {base}/models`, authenticated
pub(crate) async fn list_models(
    client: &Client,
    profile: &Profile,
    timeout: Duration,
) -> Result<Vec<String>> {
    let key = api_key(profile)?;
    let url = format!("{}/models", profile.endpoint());

    let response = client
        .get(&url)
        .bearer_auth(key)
        .timeout(timeout)
        .send()
        .await
        .map_err(map_send_error)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(error_from_status(status.as_u16(), text));
    }

    let parsed: ModelsResponse = response.json().await?;
    Ok(parsed.data.into_iter().map(|m| m.id).collect())
}
