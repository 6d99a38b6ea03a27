//! Request and result types shared by every provider branch

use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::{AppError, Result};
use crate::provider::kind::Capabilities;

/// Marker the free-form provider recognizes as "exclude the following"
pub const NEGATIVE_PROMPT_MARKER: &str = " --no ";

/// Output geometry in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Sizes offered to users by default
    pub const PRESETS: [Geometry; 3] = [
        Geometry { width: 1024, height: 1024 },
        Geometry { width: 1152, height: 896 },
        Geometry { width: 896, height: 1152 },
    ];

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `WIDTHxHEIGHT`, the form OpenAI-compatible APIs expect
    pub fn as_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Parse a `WIDTHxHEIGHT` string
    pub fn parse(size: &str) -> Option<Self> {
        let (w, h) = size.split_once(|c: char| c == 'x' || c == 'X')?;
        Some(Self {
            width: w.trim().parse().ok()?,
            height: h.trim().parse().ok()?,
        })
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::PRESETS[0]
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Flags only the free-form provider understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOptions {
    #[serde(default = "default_true")]
    pub enhance: bool,
    #[serde(default = "default_true")]
    pub private: bool,
    #[serde(default = "default_true")]
    pub nologo: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            enhance: true,
            private: true,
            nologo: true,
        }
    }
}

/// A normalized request handed to the provider adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The prompt to generate images from
    pub prompt: String,

    /// Things to avoid, folded into the prompt with [`NEGATIVE_PROMPT_MARKER`]
    pub negative_prompt: Option<String>,

    /// Provider-specific model identifier
    pub model: String,

    /// Number of images to generate
    pub count: u32,

    pub geometry: Geometry,

    /// Present only when the provider honors it
    pub options: Option<ProviderOptions>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            model: model.into(),
            count: 1,
            geometry: Geometry::default(),
            options: None,
        }
    }

    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative.into());
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_options(mut self, options: ProviderOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Prompt text actually sent upstream, negative prompt appended
    pub fn effective_prompt(&self) -> String {
        match self.negative_prompt.as_deref().map(str::trim) {
            Some(negative) if !negative.is_empty() => {
                format!("{}{}{}", self.prompt, NEGATIVE_PROMPT_MARKER, negative)
            }
            _ => self.prompt.clone(),
        }
    }

    /// Boundary check run before any network call is issued.
    ///
    /// Unsupported fields are stripped according to `caps` rather than rejected.
    pub fn validate(&mut self, caps: &Capabilities, limits: &LimitsConfig) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::InvalidRequest("Prompt cannot be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::InvalidRequest("Model cannot be empty".to_string()));
        }
        if self.count == 0 || self.count > limits.max_batch {
            return Err(AppError::InvalidRequest(format!(
                "Image count must be between 1 and {}",
                limits.max_batch
            )));
        }
        if self.count > caps.max_images {
            return Err(AppError::InvalidRequest(format!(
                "This provider supports at most {} image(s) per request, got {}",
                caps.max_images, self.count
            )));
        }

        let range = limits.min_dimension..=limits.max_dimension;
        if !range.contains(&self.geometry.width) || !range.contains(&self.geometry.height) {
            return Err(AppError::InvalidRequest(format!(
                "Size {} is outside {}..={} pixels per side",
                self.geometry, limits.min_dimension, limits.max_dimension
            )));
        }

        if !caps.supports_options {
            self.options = None;
        }
        if !caps.supports_negative_prompt {
            self.negative_prompt = None;
        }
        Ok(())
    }
}

/// Reference to a generated image: a remote URL or a `data:` URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:image")
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_data_uri() {
            write!(f, "data-uri({} bytes)", self.0.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Unified result of a generation call, one reference per image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    pub images: Vec<ImageRef>,
}
