//! The seam between session logic and the network

use async_trait::async_trait;

use crate::error::Result;
use crate::profile::Profile;
use crate::provider::types::{GenerationRequest, GenerationResult, ImageRef};

/// Everything the core needs from a remote image provider
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one generation call (no retries) against the profile's provider
    async fn generate(&self, profile: &Profile, request: &GenerationRequest) -> Result<GenerationResult>;

    /// Raw model identifiers the provider currently publishes
    async fn list_models(&self, profile: &Profile) -> Result<Vec<String>>;

    /// Connectivity and credential check; `Ok` means usable
    async fn validate(&self, profile: &Profile) -> Result<String>;

    /// Bytes behind an image reference
    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>>;
}
