//! Model registry - static catalog, classification rules, discovery and merge

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::profile::Profile;
use crate::provider::{GenerationBackend, ProviderKind};

/// Priority given to identifiers no rule recognizes
pub const FALLBACK_PRIORITY: u32 = 999;
const FALLBACK_ICON: &str = "🤖";

/// Where a descriptor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    Static,
    Discovered,
}

/// Display metadata for one model identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// Lower sorts first
    pub priority: u32,
    pub source: ModelSource,
}

/// Models known without asking any provider
pub fn static_catalog() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor {
            id: "flux.1-schnell".to_string(),
            name: "FLUX.1 Schnell".to_string(),
            description: "Fastest generation, open weights".to_string(),
            icon: "⚡".to_string(),
            priority: 1,
            source: ModelSource::Static,
        },
        ModelDescriptor {
            id: "flux.1-dev".to_string(),
            name: "FLUX.1 Dev".to_string(),
            description: "Development build balancing speed and quality".to_string(),
            icon: "🔧".to_string(),
            priority: 2,
            source: ModelSource::Static,
        },
    ]
}

struct ClassificationRule {
    pattern: Regex,
    name: &'static str,
    icon: &'static str,
    priority_base: u32,
}

/// Evaluated in order, first match wins
static RULES: Lazy<Vec<ClassificationRule>> = Lazy::new(|| {
    let rule = |pattern: &str, name, icon, priority_base| ClassificationRule {
        pattern: Regex::new(pattern).expect("valid regex"),
        name,
        icon,
        priority_base,
    };
    vec![
        rule(r"flux[.\-]?1[.\-]?schnell", "FLUX.1 Schnell", "⚡", 100),
        rule(r"flux[.\-]?1[.\-]?dev", "FLUX.1 Dev", "🔧", 200),
        rule(r"flux[.\-]?1[.\-]?pro", "FLUX.1 Pro", "👑", 300),
        rule(r"flux[.\-]?1[.\-]?kontext|kontext", "FLUX.1 Kontext", "🎯", 400),
    ]
});

/// Family keywords a listed model must contain to be kept for OpenAI-style providers
const FAMILY_KEYWORDS: [&str; 2] = ["flux", "kontext"];

pub fn is_relevant(model_id: &str) -> bool {
    let lower = model_id.to_lowercase();
    FAMILY_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Classify a discovered identifier through the rule table
pub fn classify(model_id: &str) -> ModelDescriptor {
    let lower = model_id.to_lowercase();

    match RULES.iter().find(|rule| rule.pattern.is_match(&lower)) {
        Some(rule) => ModelDescriptor {
            id: model_id.to_string(),
            name: rule.name.to_string(),
            description: format!("Discovered {} model", rule.name),
            icon: rule.icon.to_string(),
            priority: rule.priority_base + stable_hash(model_id) % 100,
            source: ModelSource::Discovered,
        },
        None => ModelDescriptor {
            id: model_id.to_string(),
            name: title_case(model_id),
            description: format!("Discovered model: {}", model_id),
            icon: FALLBACK_ICON.to_string(),
            priority: FALLBACK_PRIORITY,
            source: ModelSource::Discovered,
        },
    }
}

/// Turn raw provider identifiers into descriptors for `kind`
pub fn descriptors_for(kind: ProviderKind, model_ids: Vec<String>) -> Vec<ModelDescriptor> {
    let mut discovered: Vec<ModelDescriptor> = Vec::new();

    for id in model_ids {
        if !kind.is_free_form() && !is_relevant(&id) {
            continue;
        }
        let mut descriptor = classify(&id);
        if kind.is_free_form() {
            descriptor.icon = kind.icon().to_string();
        }
        upsert(&mut discovered, descriptor);
    }

    discovered
}

/// Query the provider for its models. Failures degrade to an empty list.
pub async fn discover(backend: &dyn GenerationBackend, profile: &Profile) -> Vec<ModelDescriptor> {
    match backend.list_models(profile).await {
        Ok(ids) => {
            let listed = ids.len();
            let discovered = descriptors_for(profile.kind, ids);
            info!(
                provider = %profile.kind,
                listed,
                kept = discovered.len(),
                "Model discovery finished"
            );
            discovered
        }
        Err(e) => {
            warn!(provider = %profile.kind, error = %e, "Model discovery failed");
            Vec::new()
        }
    }
}

/// Static catalog overlaid with `discovered`, sorted by ascending priority.
///
/// A discovered entry replaces a static one with the same id in place, so
/// equal priorities keep insertion order.
pub fn merge(static_models: &[ModelDescriptor], discovered: &[ModelDescriptor]) -> Vec<ModelDescriptor> {
    let mut merged = static_models.to_vec();
    for descriptor in discovered {
        upsert(&mut merged, descriptor.clone());
    }
    merged.sort_by_key(|m| m.priority);
    merged
}

fn upsert(models: &mut Vec<ModelDescriptor>, descriptor: ModelDescriptor) {
    match models.iter_mut().find(|m| m.id == descriptor.id) {
        Some(existing) => *existing = descriptor,
        None => models.push(descriptor),
    }
}

fn title_case(model_id: &str) -> String {
    model_id
        .split(|c: char| c == '-' || c == '_' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// FNV-1a; gives every identifier a fixed offset within its priority tier
fn stable_hash(value: &str) -> u32 {
    value.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

/// Per-session cache of the last discovery result
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    discovered: Vec<ModelDescriptor>,
    discovered_at: Option<DateTime<Utc>>,
}

impl ModelCatalog {
    pub fn set_discovered(&mut self, discovered: Vec<ModelDescriptor>) {
        self.discovered = discovered;
        self.discovered_at = Some(Utc::now());
    }

    pub fn clear(&mut self) {
        self.discovered.clear();
        self.discovered_at = None;
    }

    pub fn discovered(&self) -> &[ModelDescriptor] {
        &self.discovered
    }

    pub fn discovered_at(&self) -> Option<DateTime<Utc>> {
        self.discovered_at
    }

    pub fn merged(&self) -> Vec<ModelDescriptor> {
        merge(&static_catalog(), &self.discovered)
    }

    /// First model of the merged catalog, the default selection
    pub fn default_model(&self) -> Option<String> {
        self.merged().into_iter().next().map(|m| m.id)
    }

    pub fn display_name(&self, model_id: &str) -> String {
        self.merged()
            .into_iter()
            .find(|m| m.id == model_id)
            .map(|m| m.name)
            .unwrap_or_else(|| model_id.to_string())
    }
}
