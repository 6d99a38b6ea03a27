//! Bounded set of user-pinned images

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::history::HistoryEntry;
use crate::provider::ImageRef;

/// Non-owning pointer back to the generation an image came from.
///
/// Carries enough of the request to re-display or re-generate after the
/// history entry itself has been evicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteOrigin {
    pub history_id: Uuid,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub model: String,
}

impl From<&HistoryEntry> for FavoriteOrigin {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            history_id: entry.id,
            prompt: entry.prompt.clone(),
            negative_prompt: entry.negative_prompt.clone(),
            model: entry.model.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// Same as the image's display id
    pub id: String,
    pub image: ImageRef,
    pub pinned_at: DateTime<Utc>,
    pub origin: Option<FavoriteOrigin>,
}

/// Result of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// At capacity; nothing changed
    Full,
}

#[derive(Debug, Clone)]
pub struct FavoritesStore {
    entries: Vec<FavoriteEntry>,
    capacity: usize,
}

impl FavoritesStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Pin `id` if absent, unpin it if present. Pinning past capacity is
    /// refused with [`ToggleOutcome::Full`].
    pub fn toggle(&mut self, id: &str, image: ImageRef, source: Option<&HistoryEntry>) -> ToggleOutcome {
        if let Some(index) = self.entries.iter().position(|f| f.id == id) {
            self.entries.remove(index);
            debug!(image = %id, "Unpinned favorite");
            return ToggleOutcome::Removed;
        }

        if self.entries.len() >= self.capacity {
            warn!(image = %id, capacity = self.capacity, "Favorites are full");
            return ToggleOutcome::Full;
        }

        self.entries.push(FavoriteEntry {
            id: id.to_string(),
            image,
            pinned_at: Utc::now(),
            origin: source.map(FavoriteOrigin::from),
        });
        debug!(image = %id, "Pinned favorite");
        ToggleOutcome::Added
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|f| f.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteEntry> {
        self.entries.iter().find(|f| f.id == id)
    }

    /// Favorites by pin time, most recent first
    pub fn sorted(&self) -> Vec<FavoriteEntry> {
        let mut sorted: Vec<FavoriteEntry> = self.entries.iter().rev().cloned().collect();
        sorted.sort_by(|a, b| b.pinned_at.cmp(&a.pinned_at));
        sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
