//! Response handling module - data URIs and image resolution for download

pub mod base64;

use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::provider::{GenerationBackend, ImageRef};

/// An image reference turned into bytes
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub id: String,
    pub data: Vec<u8>,
    pub mime: String,
}

impl ResolvedImage {
    /// Suggested download file name
    pub fn filename(&self) -> String {
        format!("flux_{}.{}", self.id, base64::extension_for_mime(&self.mime))
    }
}

/// Per-image outcome of a batch resolution
#[derive(Debug, Clone, Serialize)]
pub struct ImageStatus {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<(String, Result<ResolvedImage>)> for ImageStatus {
    fn from((id, result): (String, Result<ResolvedImage>)) -> Self {
        match result {
            Ok(image) => Self {
                id,
                ok: true,
                mime: Some(image.mime),
                bytes: Some(image.data.len()),
                error: None,
            },
            Err(e) => Self {
                id,
                ok: false,
                mime: None,
                bytes: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Resolves image references through a backend
pub struct ResponseHandler<'a> {
    backend: &'a dyn GenerationBackend,
}

impl<'a> ResponseHandler<'a> {
    pub fn new(backend: &'a dyn GenerationBackend) -> Self {
        Self { backend }
    }

    /// Fetch or decode one image
    pub async fn resolve(&self, id: &str, image: &ImageRef) -> Result<ResolvedImage> {
        let data = self.backend.fetch_image(image).await?;
        let mime = base64::get_mime_from_data_url(image.as_str())
            .map(String::from)
            .or_else(|| base64::detect_mime(&data).map(String::from))
            .unwrap_or_else(|| "image/png".to_string());

        Ok(ResolvedImage {
            id: id.to_string(),
            data,
            mime,
        })
    }

    /// Resolve a batch; one bad image never fails the others
    pub async fn resolve_batch(&self, images: &[(String, ImageRef)]) -> Vec<ImageStatus> {
        let results = join_all(images.iter().map(|(id, image)| self.resolve(id, image))).await;

        images
            .iter()
            .zip(results)
            .map(|((id, _), result)| {
                if let Err(e) = &result {
                    warn!(image = %id, error = %e, "Failed to resolve image");
                }
                ImageStatus::from((id.clone(), result))
            })
            .collect()
    }
}
