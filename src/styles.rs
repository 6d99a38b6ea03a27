//! Style presets appended to prompts before generation

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    #[default]
    None,
    Cinematic,
    Anime,
    Cyberpunk,
    Watercolor,
    Fantasy,
}

impl StylePreset {
    pub const ALL: [StylePreset; 6] = [
        StylePreset::None,
        StylePreset::Cinematic,
        StylePreset::Anime,
        StylePreset::Cyberpunk,
        StylePreset::Watercolor,
        StylePreset::Fantasy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Cinematic => "Cinematic",
            Self::Anime => "Anime",
            Self::Cyberpunk => "Cyberpunk",
            Self::Watercolor => "Watercolor",
            Self::Fantasy => "Fantasy Art",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Cinematic => "cinematic, dramatic lighting, high detail, sharp focus",
            Self::Anime => "anime style, vibrant colors, clean line art",
            Self::Cyberpunk => "cyberpunk, neon lights, futuristic city, high-tech",
            Self::Watercolor => "watercolor painting, soft wash, blended colors",
            Self::Fantasy => "fantasy art, epic, detailed, magical",
        }
    }

    /// Prompt as sent to the provider
    pub fn apply(&self, prompt: &str) -> String {
        match self {
            Self::None => prompt.to_string(),
            _ => format!("{}, {}", prompt, self.suffix()),
        }
    }

    /// Label to record in history; `None` records nothing
    pub fn history_label(&self) -> Option<String> {
        match self {
            Self::None => None,
            _ => Some(self.label().to_string()),
        }
    }
}
