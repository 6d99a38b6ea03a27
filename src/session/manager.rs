//! Session manager - every user-facing operation, keyed by session id

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::history::{FavoriteEntry, HistoryEntry, HistoryMetadata, ToggleOutcome};
use crate::models::{self, ModelDescriptor};
use crate::profile::Profile;
use crate::provider::{
    GenerationBackend, GenerationRequest, Geometry, ImageRef, ProviderOptions, RetryController,
};
use crate::response::{ImageStatus, ResolvedImage, ResponseHandler};
use crate::session::state::Session;
use crate::styles::StylePreset;

/// Result of a connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub message: String,
}

/// Profiles as shown to a client, secrets masked
#[derive(Debug, Clone, Serialize)]
pub struct ProfileListing {
    pub active: String,
    pub profiles: Vec<Profile>,
}

/// What a user submits to generate images
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateInput {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: Option<String>,
    /// Defaults to the first model of the merged catalog
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub style: StylePreset,
    /// Free-form provider flags; all on when omitted
    #[serde(default)]
    pub options: Option<ProviderOptions>,
}

fn default_count() -> u32 {
    1
}

impl GenerateInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            model: None,
            count: default_count(),
            geometry: Geometry::default(),
            style: StylePreset::None,
            options: None,
        }
    }
}

/// Fields to prefill a new request from a past one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaryPrefill {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub model: String,
}

/// Result of a favorite toggle
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteToggle {
    pub outcome: ToggleOutcome,
    pub favorites: usize,
    pub capacity: usize,
}

/// Owns all sessions and the shared, stateless provider plumbing
pub struct SessionManager {
    sessions: DashMap<Uuid, Arc<Session>>,
    settings: Arc<Settings>,
    backend: Arc<dyn GenerationBackend>,
    retry: RetryController,
}

impl SessionManager {
    pub fn new(settings: Arc<Settings>, backend: Arc<dyn GenerationBackend>) -> Self {
        let retry = RetryController::from_config(&settings.retry);
        Self::with_retry(settings, backend, retry)
    }

    pub fn with_retry(
        settings: Arc<Settings>,
        backend: Arc<dyn GenerationBackend>,
        retry: RetryController,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            settings,
            backend,
            retry,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ---- sessions ----

    pub fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(&self.settings));
        self.sessions.insert(session.id, Arc::clone(&session));
        info!(session = %session.id, sessions = self.sessions.len(), "Created session");
        session
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<Session>> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
    }

    pub fn remove(&self, id: Uuid) -> Result<()> {
        match self.sessions.remove(&id) {
            Some(_) => {
                info!(session = %id, "Dropped session");
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // ---- profiles ----

    pub fn list_profiles(&self, id: Uuid) -> Result<ProfileListing> {
        let session = self.get(id)?;
        Ok(session.with_state(|s| ProfileListing {
            active: s.profiles.active().name.clone(),
            profiles: s.profiles.list().iter().map(Profile::redacted).collect(),
        }))
    }

    pub fn active_profile(&self, id: Uuid) -> Result<Profile> {
        let session = self.get(id)?;
        Ok(session.with_state(|s| s.profiles.active().redacted()))
    }

    /// Switch the active profile; the discovered models belonged to the old one
    pub async fn set_active(&self, id: Uuid, name: &str) -> Result<Profile> {
        let session = self.get(id)?;
        let _action = session.begin_action().await;

        session.with_state(|s| {
            if !s.profiles.set_active(name) {
                return Err(AppError::ProfileNotFound(name.to_string()));
            }
            s.models.clear();
            Ok(s.profiles.active().redacted())
        })
    }

    /// Check connectivity, then store `profile` with the outcome recorded.
    ///
    /// A failed check still saves the profile, unvalidated. When
    /// `previous_name` differs from the new name the old profile is removed.
    pub async fn save_profile(
        &self,
        id: Uuid,
        previous_name: Option<&str>,
        mut profile: Profile,
    ) -> Result<ValidationOutcome> {
        if profile.name.trim().is_empty() {
            return Err(AppError::InvalidRequest("Profile name cannot be empty".to_string()));
        }
        profile.name = profile.name.trim().to_string();

        let session = self.get(id)?;
        let _action = session.begin_action().await;

        let outcome = self.check_connectivity(&profile).await;
        profile.validated = outcome.valid;

        session.with_state(|s| {
            s.profiles.upsert(previous_name, profile)?;
            s.models.clear();
            Ok::<_, AppError>(())
        })?;

        Ok(outcome)
    }

    /// Re-run the connectivity check for a stored profile
    pub async fn validate_profile(&self, id: Uuid, name: &str) -> Result<ValidationOutcome> {
        let session = self.get(id)?;
        let _action = session.begin_action().await;

        let profile = session
            .with_state(|s| s.profiles.get(name).cloned())
            .ok_or_else(|| AppError::ProfileNotFound(name.to_string()))?;

        let outcome = self.check_connectivity(&profile).await;
        session.with_state(|s| s.profiles.set_validated(name, outcome.valid));
        Ok(outcome)
    }

    pub async fn delete_profile(&self, id: Uuid, name: &str) -> Result<Profile> {
        let session = self.get(id)?;
        let _action = session.begin_action().await;

        session.with_state(|s| {
            let was_active = s.profiles.active().name == name;
            let removed = s.profiles.delete(name)?;
            if was_active {
                s.models.clear();
            }
            Ok(removed.redacted())
        })
    }

    async fn check_connectivity(&self, profile: &Profile) -> ValidationOutcome {
        match self.backend.validate(profile).await {
            Ok(message) => {
                info!(profile = %profile.name, provider = %profile.kind, "Profile validated");
                ValidationOutcome { valid: true, message }
            }
            Err(e) => {
                warn!(profile = %profile.name, provider = %profile.kind, error = %e, "Profile validation failed");
                ValidationOutcome {
                    valid: false,
                    message: e.to_string(),
                }
            }
        }
    }

    // ---- models ----

    /// Static catalog merged with the last discovery result
    pub fn models(&self, id: Uuid) -> Result<Vec<ModelDescriptor>> {
        let session = self.get(id)?;
        Ok(session.with_state(|s| s.models.merged()))
    }

    /// Ask the active provider for its models and cache what it reports
    pub async fn discover_models(&self, id: Uuid) -> Result<Vec<ModelDescriptor>> {
        let session = self.get(id)?;
        let _action = session.begin_action().await;

        let profile = session.with_state(|s| s.profiles.active().clone());
        let discovered = models::discover(self.backend.as_ref(), &profile).await;

        Ok(session.with_state(|s| {
            if s.profiles.active().name == profile.name {
                s.models.set_discovered(discovered);
            } else {
                debug!(session = %id, profile = %profile.name, "Active profile changed, dropping discovered models");
            }
            s.models.merged()
        }))
    }

    // ---- generation ----

    /// Validate, generate with retry, and record the result in history
    pub async fn generate(&self, id: Uuid, input: GenerateInput) -> Result<HistoryEntry> {
        let session = self.get(id)?;
        let _action = session.begin_action().await;

        let (profile, default_model) =
            session.with_state(|s| (s.profiles.active().clone(), s.models.default_model()));

        let model = input
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .or(default_model)
            .unwrap_or_default();

        let caps = profile.kind.capabilities(self.settings.limits.max_batch);
        let mut request = GenerationRequest::new(input.prompt.trim(), model)
            .with_count(input.count)
            .with_geometry(input.geometry)
            .with_options(input.options.unwrap_or_default());
        if let Some(negative) = input.negative_prompt.as_deref().map(str::trim) {
            if !negative.is_empty() {
                request = request.with_negative_prompt(negative);
            }
        }
        request.validate(&caps, &self.settings.limits)?;

        if !profile.validated {
            return Err(AppError::ProfileNotValidated(profile.name));
        }

        let mut outbound = request.clone();
        outbound.prompt = input.style.apply(&request.prompt);

        let result = self
            .retry
            .run(|attempt| {
                debug!(session = %id, provider = %profile.kind, attempt, "Calling provider");
                self.backend.generate(&profile, &outbound)
            })
            .await?;

        let entry = HistoryEntry::new(
            request.prompt,
            request.negative_prompt,
            request.model,
            result.images,
            HistoryMetadata {
                geometry: request.geometry,
                provider: profile.kind,
                style: input.style.history_label(),
            },
        );

        session.with_state(|s| s.history.record(entry.clone()));
        info!(
            session = %id,
            entry = %entry.id,
            provider = %profile.kind,
            model = %entry.model,
            images = entry.images.len(),
            "Recorded generation"
        );

        Ok(entry)
    }

    // ---- history ----

    pub fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>> {
        let session = self.get(id)?;
        Ok(session.with_state(|s| s.history.to_vec()))
    }

    /// Remove one entry. Favorites that came from it stay.
    pub fn remove_history(&self, id: Uuid, entry_id: Uuid) -> Result<HistoryEntry> {
        let session = self.get(id)?;
        session
            .with_state(|s| s.history.remove(entry_id))
            .ok_or_else(|| AppError::EntryNotFound(entry_id.to_string()))
    }

    /// Clear the history, returning how many entries were dropped
    pub fn clear_history(&self, id: Uuid) -> Result<usize> {
        let session = self.get(id)?;
        Ok(session.with_state(|s| {
            let dropped = s.history.len();
            s.history.clear();
            dropped
        }))
    }

    pub fn vary(&self, id: Uuid, entry_id: Uuid) -> Result<VaryPrefill> {
        let entry = self.entry(id, entry_id)?;
        Ok(VaryPrefill {
            prompt: entry.prompt,
            negative_prompt: entry.negative_prompt,
            model: entry.model,
        })
    }

    /// Resolve every image of an entry, reporting each one separately
    pub async fn entry_images(&self, id: Uuid, entry_id: Uuid) -> Result<Vec<ImageStatus>> {
        let entry = self.entry(id, entry_id)?;
        let images: Vec<(String, ImageRef)> = entry
            .image_ids()
            .into_iter()
            .zip(entry.images)
            .collect();

        Ok(ResponseHandler::new(self.backend.as_ref())
            .resolve_batch(&images)
            .await)
    }

    fn entry(&self, id: Uuid, entry_id: Uuid) -> Result<HistoryEntry> {
        let session = self.get(id)?;
        session
            .with_state(|s| s.history.get(entry_id).cloned())
            .ok_or_else(|| AppError::EntryNotFound(entry_id.to_string()))
    }

    // ---- favorites ----

    /// Pin or unpin an image by display id.
    ///
    /// Images still in history are pinned with a back-reference; an image
    /// whose entry is gone can only be unpinned.
    pub fn toggle_favorite(&self, id: Uuid, image_id: &str) -> Result<FavoriteToggle> {
        let session = self.get(id)?;
        session.with_state(|s| {
            let outcome = if let Some((entry, image)) = s.history.find_image(image_id) {
                s.favorites.toggle(image_id, image.clone(), Some(entry))
            } else if let Some(image) = s.favorites.get(image_id).map(|f| f.image.clone()) {
                s.favorites.toggle(image_id, image, None)
            } else {
                return Err(AppError::ImageNotFound(image_id.to_string()));
            };

            Ok(FavoriteToggle {
                outcome,
                favorites: s.favorites.len(),
                capacity: s.favorites.capacity(),
            })
        })
    }

    pub fn favorites(&self, id: Uuid) -> Result<Vec<FavoriteEntry>> {
        let session = self.get(id)?;
        Ok(session.with_state(|s| s.favorites.sorted()))
    }

    // ---- download ----

    /// Bytes of an image from history or favorites
    pub async fn download_image(&self, id: Uuid, image_id: &str) -> Result<ResolvedImage> {
        let session = self.get(id)?;
        let image = session
            .with_state(|s| {
                s.history
                    .find_image(image_id)
                    .map(|(_, image)| image.clone())
                    .or_else(|| s.favorites.get(image_id).map(|f| f.image.clone()))
            })
            .ok_or_else(|| AppError::ImageNotFound(image_id.to_string()))?;

        ResponseHandler::new(self.backend.as_ref())
            .resolve(image_id, &image)
            .await
    }
}
