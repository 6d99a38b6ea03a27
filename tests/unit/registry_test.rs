//! Unit tests for the model registry

use imagegen_studio::models::{self, ModelDescriptor, ModelSource};
use imagegen_studio::profile::Profile;
use imagegen_studio::provider::ProviderKind;
use imagegen_studio::AppError;

use crate::support::ScriptedBackend;

fn discovered(id: &str, priority: u32) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: format!("Discovered {}", id),
        description: String::new(),
        icon: "🤖".to_string(),
        priority,
        source: ModelSource::Discovered,
    }
}

#[test]
fn test_merge_discovered_wins_and_sorts() {
    let statics = models::static_catalog();
    let overlaps = [
        vec![discovered("flux.1-dev", 0)],
        vec![discovered("flux.1-schnell", 500), discovered("flux.1-dev", 400)],
        vec![discovered("x", 1), discovered("flux.1-schnell", 1)],
    ];

    for discovered_set in overlaps {
        let merged = models::merge(&statics, &discovered_set);

        for d in &discovered_set {
            let found: Vec<&ModelDescriptor> = merged.iter().filter(|m| m.id == d.id).collect();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0], d);
        }
        assert!(merged.windows(2).all(|w| w[0].priority <= w[1].priority));
    }
}

#[test]
fn test_classification_tiers() {
    let pro = models::classify("FLUX.1-pro-ultra");
    assert_eq!(pro.name, "FLUX.1 Pro");
    assert!((300..400).contains(&pro.priority));
    assert_eq!(pro.source, ModelSource::Discovered);

    let dev = models::classify("flux-1-dev");
    assert!((200..300).contains(&dev.priority));

    let unknown = models::classify("stable-diffusion");
    assert_eq!(unknown.name, "Stable Diffusion");
    assert!(unknown.priority > pro.priority);
}

#[tokio::test]
async fn test_discover_filters_for_credentialed_provider() {
    let backend = ScriptedBackend::new();
    backend.set_models(Ok(vec![
        "dall-e-3".to_string(),
        "black-forest-labs/flux.1-schnell".to_string(),
        "flux-kontext-pro".to_string(),
    ]));
    let profile = Profile::new("navy", ProviderKind::Navy).with_api_key("sk-1");

    let found = models::discover(backend.as_ref(), &profile).await;
    let ids: Vec<&str> = found.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["black-forest-labs/flux.1-schnell", "flux-kontext-pro"]);
}

#[tokio::test]
async fn test_discover_failure_yields_empty() {
    let backend = ScriptedBackend::new();
    backend.set_models(Err(AppError::Api {
        status: 503,
        message: "down".into(),
    }));

    let found = models::discover(backend.as_ref(), &Profile::default()).await;
    assert!(found.is_empty());
}
