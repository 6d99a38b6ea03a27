//! Bounded generation history, newest first

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;
use uuid::Uuid;

use crate::provider::{Geometry, ImageRef, ProviderKind};

/// Context recorded alongside a generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMetadata {
    pub geometry: Geometry,
    pub provider: ProviderKind,
    /// Style preset label, if one was applied
    pub style: Option<String>,
}

/// One successful generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub model: String,
    pub images: Vec<ImageRef>,
    pub metadata: HistoryMetadata,
}

impl HistoryEntry {
    pub fn new(
        prompt: impl Into<String>,
        negative_prompt: Option<String>,
        model: impl Into<String>,
        images: Vec<ImageRef>,
        metadata: HistoryMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            prompt: prompt.into(),
            negative_prompt,
            model: model.into(),
            images,
            metadata,
        }
    }

    /// Display id of the image at `index`
    pub fn image_id(&self, index: usize) -> String {
        format!("{}_{}", self.id, index)
    }

    pub fn image_ids(&self) -> Vec<String> {
        (0..self.images.len()).map(|i| self.image_id(i)).collect()
    }

    /// Image whose display id is `image_id`, if it belongs to this entry
    pub fn image(&self, image_id: &str) -> Option<&ImageRef> {
        let (entry_id, index) = image_id.rsplit_once('_')?;
        if entry_id != self.id.to_string() {
            return None;
        }
        self.images.get(index.parse::<usize>().ok()?)
    }
}

/// Ring-buffer-like history: prepend, then drop the oldest past `capacity`
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record a generation at position 0, evicting the oldest entries
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!(entry = %evicted.id, "Evicted oldest history entry");
            }
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Locate an image by display id across all entries
    pub fn find_image(&self, image_id: &str) -> Option<(&HistoryEntry, &ImageRef)> {
        self.entries
            .iter()
            .find_map(|entry| entry.image(image_id).map(|image| (entry, image)))
    }

    pub fn remove(&mut self, id: Uuid) -> Option<HistoryEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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
