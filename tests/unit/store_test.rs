//! Unit tests for the profile, history and favorites stores

use imagegen_studio::history::{
    FavoritesStore, HistoryEntry, HistoryMetadata, HistoryStore, ToggleOutcome,
};
use imagegen_studio::profile::{Profile, ProfileStore};
use imagegen_studio::provider::{Geometry, ImageRef, ProviderKind};
use imagegen_studio::AppError;

fn entry(prompt: &str, images: usize) -> HistoryEntry {
    HistoryEntry::new(
        prompt,
        None,
        "flux.1-schnell",
        (0..images)
            .map(|i| ImageRef::url(format!("https://img.example/{}/{}.png", prompt, i)))
            .collect(),
        HistoryMetadata {
            geometry: Geometry::default(),
            provider: ProviderKind::Navy,
            style: None,
        },
    )
}

#[test]
fn test_history_eviction_for_any_overflow() {
    for capacity in 1..6 {
        for inserts in 0..12 {
            let mut store = HistoryStore::new(capacity);
            for i in 0..inserts {
                store.record(entry(&format!("p{}", i), 1));
            }

            assert_eq!(store.len(), inserts.min(capacity));
            let prompts: Vec<String> = store.entries().map(|e| e.prompt.clone()).collect();
            let expected: Vec<String> = (0..inserts)
                .rev()
                .take(capacity)
                .map(|i| format!("p{}", i))
                .collect();
            assert_eq!(prompts, expected);
        }
    }
}

#[test]
fn test_history_image_ids() {
    let e = entry("cat", 3);
    let ids = e.image_ids();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[2], format!("{}_2", e.id));
    assert_eq!(e.image(&ids[1]), Some(&e.images[1]));
}

#[test]
fn test_favorites_parity_and_bound() {
    let mut store = FavoritesStore::new(3);
    let ids = ["a", "b", "c", "d", "a", "e", "b", "a"];
    let mut calls = std::collections::HashMap::new();

    for id in ids {
        let outcome = store.toggle(id, ImageRef::url(format!("https://img.example/{}", id)), None);
        if outcome != ToggleOutcome::Full {
            *calls.entry(id).or_insert(0) += 1;
        }
        assert!(store.len() <= store.capacity());
    }

    for (id, count) in calls {
        assert_eq!(store.contains(id), count % 2 == 1, "id {}", id);
    }
}

#[test]
fn test_favorite_keeps_origin_snapshot() {
    let mut history = HistoryStore::new(5);
    let mut favorites = FavoritesStore::new(5);

    let e = entry("owl", 1);
    let image_id = e.image_id(0);
    let entry_id = e.id;
    history.record(e);

    let (source, image) = history.find_image(&image_id).unwrap();
    favorites.toggle(&image_id, image.clone(), Some(source));

    history.clear();
    let favorite = favorites.get(&image_id).unwrap();
    assert_eq!(favorite.origin.as_ref().map(|o| o.history_id), Some(entry_id));
    assert_eq!(favorite.origin.as_ref().map(|o| o.prompt.as_str()), Some("owl"));
}

#[test]
fn test_profile_store_never_empty() {
    let mut store = ProfileStore::default();
    assert_eq!(store.len(), 1);

    let err = store.delete("default").unwrap_err();
    assert!(matches!(err, AppError::LastProfile(_)));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_profile_delete_reassigns_active() {
    let mut store = ProfileStore::new(vec![
        Profile::new("a", ProviderKind::Pollinations),
        Profile::new("b", ProviderKind::Navy),
        Profile::new("c", ProviderKind::Custom),
    ]);
    assert!(store.set_active("c"));

    store.delete("c").unwrap();
    assert_eq!(store.active().name, "a");
    assert_eq!(store.len(), 2);

    assert!(store.set_active("b"));
    store.delete("a").unwrap();
    assert_eq!(store.active().name, "b");

    assert!(matches!(
        store.delete("zzz").unwrap_err(),
        AppError::ProfileNotFound(_)
    ));
}

#[test]
fn test_profile_set_active_unknown_is_noop() {
    let mut store = ProfileStore::new(vec![
        Profile::new("a", ProviderKind::Pollinations),
        Profile::new("b", ProviderKind::Navy),
    ]);
    assert!(!store.set_active("missing"));
    assert_eq!(store.active().name, "a");
}

#[test]
fn test_profile_rename_of_inactive_profile() {
    let mut store = ProfileStore::new(vec![
        Profile::new("a", ProviderKind::Pollinations),
        Profile::new("b", ProviderKind::Navy),
    ]);

    store
        .upsert(Some("b"), Profile::new("b2", ProviderKind::Navy))
        .unwrap();

    let names: Vec<&str> = store.list().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b2"]);
    assert_eq!(store.active().name, "a");
}

#[test]
fn test_profile_upsert_rejects_blank_name() {
    let mut store = ProfileStore::default();
    let err = store
        .upsert(None, Profile::new("  ", ProviderKind::Pollinations))
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRequest(_)));
}
