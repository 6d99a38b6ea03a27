//! Provider kinds and the per-provider capability table

use serde::{Deserialize, Serialize};

/// Closed set of supported image generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI or any API exposing the same images surface
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    /// Navy, an OpenAI-compatible vendor
    Navy,
    /// Pollinations.ai, a free-form query-string image endpoint
    Pollinations,
    /// User supplied OpenAI-compatible endpoint
    Custom,
}

/// What a provider honors from a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Largest image count a single call may request
    pub max_images: u32,
    /// Whether the enhance/private/nologo options bag is forwarded
    pub supports_options: bool,
    /// Whether the negative prompt is forwarded (as a `--no` suffix)
    pub supports_negative_prompt: bool,
    /// Whether a credential must be present before any network call
    pub requires_credential: bool,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAiCompatible,
        ProviderKind::Navy,
        ProviderKind::Pollinations,
        ProviderKind::Custom,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "OpenAI Compatible",
            Self::Navy => "Navy API",
            Self::Pollinations => "Pollinations.ai",
            Self::Custom => "Custom API",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "https://api.openai.com/v1",
            Self::Navy => "https://api.navy/v1",
            Self::Pollinations => "https://image.pollinations.ai",
            Self::Custom => "",
        }
    }

    /// Prefix real keys for this provider usually carry
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible | Self::Navy => "sk-",
            Self::Pollinations | Self::Custom => "",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "🤖",
            Self::Navy => "⚓",
            Self::Pollinations => "🌸",
            Self::Custom => "🔧",
        }
    }

    /// True for the provider that encodes the prompt in the URL and returns raw bytes
    pub fn is_free_form(&self) -> bool {
        matches!(self, Self::Pollinations)
    }

    /// Capability row for this provider; `max_batch` caps batching providers
    pub fn capabilities(&self, max_batch: u32) -> Capabilities {
        match self {
            Self::Pollinations => Capabilities {
                max_images: 1,
                supports_options: true,
                supports_negative_prompt: true,
                requires_credential: false,
            },
            Self::OpenAiCompatible | Self::Navy | Self::Custom => Capabilities {
                max_images: max_batch,
                supports_options: false,
                supports_negative_prompt: true,
                requires_credential: true,
            },
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAiCompatible => write!(f, "openai_compatible"),
            Self::Navy => write!(f, "navy"),
            Self::Pollinations => write!(f, "pollinations"),
            Self::Custom => write!(f, "custom"),
        }
    }
}
