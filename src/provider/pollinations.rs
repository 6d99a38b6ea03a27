//! Pollinations.ai free-form query provider.
//!
//! The whole request rides in the URL: `GET {base}/prompt/{prompt}?model=..`,
//! and the body of a successful response is the raw image.

use rand::Rng;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::profile::{AuthMode, Profile};
use crate::provider::adapter::{error_from_status, map_send_error};
use crate::provider::types::{GenerationRequest, GenerationResult, ImageRef};
use crate::response::base64;

const MAX_SEED: u32 = 1_000_000;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelListing {
    Name(String),
    Entry { name: String },
}

impl ModelListing {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Entry { name } => name,
        }
    }
}

fn parse_endpoint(profile: &Profile) -> Result<Url> {
    Url::parse(profile.endpoint()).map_err(|e| {
        AppError::InvalidRequest(format!("Invalid endpoint URL '{}': {}", profile.endpoint(), e))
    })
}

/// Build the generation URL with a caller-chosen seed
pub fn build_generation_url(profile: &Profile, request: &GenerationRequest, seed: u32) -> Result<Url> {
    let mut url = parse_endpoint(profile)?;
    let prompt = request.effective_prompt();

    url.path_segments_mut()
        .map_err(|_| AppError::InvalidRequest(format!("Endpoint '{}' cannot carry a path", profile.endpoint())))?
        .pop_if_empty()
        .push("prompt")
        .push(&prompt);

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("model", &request.model)
            .append_pair("width", &request.geometry.width.to_string())
            .append_pair("height", &request.geometry.height.to_string())
            .append_pair("seed", &seed.to_string());

        if let Some(options) = &request.options {
            query
                .append_pair("nologo", bool_param(options.nologo))
                .append_pair("private", bool_param(options.private))
                .append_pair("enhance", bool_param(options.enhance));
        }
    }

    Ok(url)
}

fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Layer the profile's auth sub-mode onto a request. Blank secrets send nothing.
pub(crate) fn apply_auth(builder: RequestBuilder, auth: &AuthMode) -> RequestBuilder {
    match auth {
        AuthMode::Token { token } if !token.trim().is_empty() => builder.bearer_auth(token.trim()),
        AuthMode::Referrer { domain } if !domain.trim().is_empty() => {
            builder.header(reqwest::header::REFERER, domain.trim())
        }
        _ => builder,
    }
}

pub(crate) async fn generate(
    client: &Client,
    profile: &Profile,
    request: &GenerationRequest,
    timeout: Duration,
) -> Result<GenerationResult> {
    if request.count != 1 {
        return Err(AppError::InvalidRequest(format!(
            "{} produces exactly one image per request, got {}",
            profile.kind.display_name(),
            request.count
        )));
    }

    let seed = rand::thread_rng().gen_range(0..=MAX_SEED);
    let url = build_generation_url(profile, request, seed)?;

    debug!(provider = %profile.kind, model = %request.model, seed, "Requesting free-form image");

    let response = apply_auth(client.get(url), &profile.auth)
        .timeout(timeout)
        .send()
        .await
        .map_err(map_send_error)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(error_from_status(status.as_u16(), text));
    }

    let declared = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("image/"))
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

    let bytes = response.bytes().await.map_err(map_send_error)?;
    if bytes.is_empty() {
        return Err(AppError::Api {
            status: status.as_u16(),
            message: "Provider returned an empty image body".to_string(),
        });
    }

    let mime = declared
        .or_else(|| base64::detect_mime(&bytes).map(String::from))
        .unwrap_or_else(|| "image/png".to_string());

    Ok(GenerationResult {
        images: vec![ImageRef(base64::create_data_url(&bytes, &mime))],
    })
}

/// `GET {base}/models` - unauthenticated list of published model names
pub(crate) async fn list_models(client: &Client, profile: &Profile, timeout: Duration) -> Result<Vec<String>> {
    let mut url = parse_endpoint(profile)?;
    url.path_segments_mut()
        .map_err(|_| AppError::InvalidRequest(format!("Endpoint '{}' cannot carry a path", profile.endpoint())))?
        .pop_if_empty()
        .push("models");

    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(map_send_error)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(error_from_status(status.as_u16(), text));
    }

    let listing: Vec<ModelListing> = response.json().await?;
    Ok(listing.into_iter().map(ModelListing::into_name).collect())
}
