//! HTTP handlers over the session manager

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::history::{FavoriteEntry, HistoryEntry};
use crate::models::ModelDescriptor;
use crate::profile::Profile;
use crate::provider::{Capabilities, Geometry, ProviderKind};
use crate::response::ImageStatus;
use crate::session::{
    FavoriteToggle, GenerateInput, ProfileListing, SessionManager, ValidationOutcome, VaryPrefill,
};
use crate::styles::StylePreset;

type AppState = Arc<SessionManager>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub sessions: usize,
}

pub async fn health(State(manager): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sessions: manager.len(),
    })
}

#[derive(Serialize)]
pub struct ProviderInfo {
    pub kind: ProviderKind,
    pub name: &'static str,
    pub default_base_url: &'static str,
    pub icon: &'static str,
    pub capabilities: Capabilities,
}

pub async fn list_providers(State(manager): State<AppState>) -> Json<Vec<ProviderInfo>> {
    let max_batch = manager.settings().limits.max_batch;
    Json(
        ProviderKind::ALL
            .iter()
            .map(|kind| ProviderInfo {
                kind: *kind,
                name: kind.display_name(),
                default_base_url: kind.default_base_url(),
                icon: kind.icon(),
                capabilities: kind.capabilities(max_batch),
            })
            .collect(),
    )
}

#[derive(Serialize)]
pub struct StyleInfo {
    pub id: StylePreset,
    pub label: &'static str,
    pub suffix: &'static str,
}

#[derive(Serialize)]
pub struct StylesResponse {
    pub styles: Vec<StyleInfo>,
    pub geometries: Vec<Geometry>,
}

pub async fn list_styles() -> Json<StylesResponse> {
    Json(StylesResponse {
        styles: StylePreset::ALL
            .iter()
            .map(|style| StyleInfo {
                id: *style,
                label: style.label(),
                suffix: style.suffix(),
            })
            .collect(),
        geometries: Geometry::PRESETS.to_vec(),
    })
}

// ---- sessions ----

#[derive(Serialize)]
pub struct SessionCreated {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

pub async fn create_session(State(manager): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session = manager.create();
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            id: session.id,
            created_at: session.created_at,
        }),
    )
}

pub async fn delete_session(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    manager.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- profiles ----

pub async fn list_profiles(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileListing>> {
    Ok(Json(manager.list_profiles(id)?))
}

pub async fn active_profile(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>> {
    Ok(Json(manager.active_profile(id)?))
}

#[derive(Deserialize)]
pub struct SaveProfileRequest {
    /// Name the profile was loaded under, when renaming
    #[serde(default)]
    pub previous_name: Option<String>,
    pub profile: Profile,
}

pub async fn save_profile(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveProfileRequest>,
) -> Result<Json<ValidationOutcome>> {
    debug!(session = %id, profile = %request.profile.name, "Saving profile");
    let outcome = manager
        .save_profile(id, request.previous_name.as_deref(), request.profile)
        .await?;
    Ok(Json(outcome))
}

pub async fn activate_profile(
    State(manager): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<Profile>> {
    Ok(Json(manager.set_active(id, &name).await?))
}

pub async fn validate_profile(
    State(manager): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<ValidationOutcome>> {
    Ok(Json(manager.validate_profile(id, &name).await?))
}

pub async fn delete_profile(
    State(manager): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<Profile>> {
    Ok(Json(manager.delete_profile(id, &name).await?))
}

// ---- models ----

pub async fn list_models(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ModelDescriptor>>> {
    Ok(Json(manager.models(id)?))
}

pub async fn discover_models(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ModelDescriptor>>> {
    Ok(Json(manager.discover_models(id).await?))
}

// ---- generation ----

#[derive(Serialize)]
pub struct GenerateResponse {
    pub image_ids: Vec<String>,
    pub entry: HistoryEntry,
}

pub async fn generate(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<GenerateInput>,
) -> Result<Json<GenerateResponse>> {
    let entry = manager.generate(id, input).await?;
    Ok(Json(GenerateResponse {
        image_ids: entry.image_ids(),
        entry,
    }))
}

// ---- history ----

pub async fn list_history(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoryEntry>>> {
    Ok(Json(manager.history(id)?))
}

#[derive(Serialize)]
pub struct HistoryCleared {
    pub removed: usize,
}

pub async fn clear_history(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryCleared>> {
    Ok(Json(HistoryCleared {
        removed: manager.clear_history(id)?,
    }))
}

pub async fn remove_history(
    State(manager): State<AppState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<HistoryEntry>> {
    Ok(Json(manager.remove_history(id, entry_id)?))
}

pub async fn vary(
    State(manager): State<AppState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<VaryPrefill>> {
    Ok(Json(manager.vary(id, entry_id)?))
}

pub async fn entry_images(
    State(manager): State<AppState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<ImageStatus>>> {
    Ok(Json(manager.entry_images(id, entry_id).await?))
}

// ---- favorites ----

pub async fn list_favorites(
    State(manager): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FavoriteEntry>>> {
    Ok(Json(manager.favorites(id)?))
}

pub async fn toggle_favorite(
    State(manager): State<AppState>,
    Path((id, image_id)): Path<(Uuid, String)>,
) -> Result<Json<FavoriteToggle>> {
    Ok(Json(manager.toggle_favorite(id, &image_id)?))
}

// ---- download ----

pub async fn download_image(
    State(manager): State<AppState>,
    Path((id, image_id)): Path<(Uuid, String)>,
) -> Result<Response> {
    let image = manager.download_image(id, &image_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", image.filename());

    Ok((
        [
            (header::CONTENT_TYPE, image.mime.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image.data,
    )
        .into_response())
}
