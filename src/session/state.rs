//! Per-session state container

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::Settings;
use crate::history::{FavoritesStore, HistoryStore};
use crate::models::ModelCatalog;
use crate::profile::ProfileStore;

/// Every store one user interacts with. Nothing here is shared across sessions.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub profiles: ProfileStore,
    pub history: HistoryStore,
    pub favorites: FavoritesStore,
    pub models: ModelCatalog,
}

impl SessionState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            profiles: ProfileStore::new(settings.seed_profiles()),
            history: HistoryStore::new(settings.limits.max_history),
            favorites: FavoritesStore::new(settings.limits.max_favorites),
            models: ModelCatalog::default(),
        }
    }
}

/// A session: its state plus the lock that serializes whole interactions.
///
/// `state` is only held for synchronous reads and writes. `action` is held
/// across the network calls of a generate, discover or save so two of them
/// never interleave on the same session.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    state: Mutex<SessionState>,
    action: tokio::sync::Mutex<()>,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: Mutex::new(SessionState::new(settings)),
            action: tokio::sync::Mutex::new(()),
        }
    }

    /// Run `f` with exclusive access to the state. Must not be called while
    /// already inside another `with_state` on the same session.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Wait until no other interaction is running on this session
    pub async fn begin_action(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.action.lock().await
    }
}
