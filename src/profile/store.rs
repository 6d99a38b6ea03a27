//! Profile store with exactly one active profile

use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::profile::Profile;

/// Ordered set of profiles keyed by name. Never empty.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles: Vec<Profile>,
    active: usize,
}

impl ProfileStore {
    /// Build a store from seed profiles; the first one starts active.
    ///
    /// Later duplicates of a name are dropped, and an empty seed yields the
    /// default anonymous profile.
    pub fn new(seed: Vec<Profile>) -> Self {
        let mut profiles: Vec<Profile> = Vec::with_capacity(seed.len());
        for profile in seed {
            if !profiles.iter().any(|p| p.name == profile.name) {
                profiles.push(profile);
            }
        }
        if profiles.is_empty() {
            profiles.push(Profile::default());
        }
        Self { profiles, active: 0 }
    }

    pub fn list(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn active(&self) -> &Profile {
        &self.profiles[self.active]
    }

    /// Switch the active profile. Unknown names leave the store untouched.
    pub fn set_active(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.active = index;
                debug!(profile = %name, "Switched active profile");
                true
            }
            None => false,
        }
    }

    /// Insert or replace `profile`. When `previous_name` names a different
    /// existing profile, that one is removed afterwards (rename); if it was
    /// active, the renamed profile becomes active.
    pub fn upsert(&mut self, previous_name: Option<&str>, profile: Profile) -> Result<()> {
        if profile.name.trim().is_empty() {
            return Err(AppError::InvalidRequest("Profile name cannot be empty".to_string()));
        }

        let name = profile.name.clone();
        let renamed_from = previous_name
            .filter(|old| *old != name)
            .and_then(|old| self.position(old));
        let follow_active = renamed_from == Some(self.active);

        match self.position(&name) {
            Some(index) => self.profiles[index] = profile,
            None => self.profiles.push(profile),
        }

        if let Some(old_index) = renamed_from {
            let old = self.profiles[old_index].name.clone();
            self.remove_at(old_index);
            info!(from = %old, to = %name, "Renamed profile");
        }

        if follow_active {
            self.set_active(&name);
        }

        info!(profile = %name, "Saved profile");
        Ok(())
    }

    /// Record the outcome of a connectivity check
    pub fn set_validated(&mut self, name: &str, validated: bool) -> bool {
        match self.profiles.iter_mut().find(|p| p.name == name) {
            Some(profile) => {
                profile.validated = validated;
                true
            }
            None => false,
        }
    }

    /// Delete a profile. The last remaining profile cannot be deleted; when
    /// the active profile goes, the first remaining one takes over.
    pub fn delete(&mut self, name: &str) -> Result<Profile> {
        let index = self
            .position(name)
            .ok_or_else(|| AppError::ProfileNotFound(name.to_string()))?;

        if self.profiles.len() == 1 {
            return Err(AppError::LastProfile(name.to_string()));
        }

        let removed = self.remove_at(index);
        info!(profile = %name, active = %self.active().name, "Deleted profile");
        Ok(removed)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name == name)
    }

    fn remove_at(&mut self, index: usize) -> Profile {
        let removed = self.profiles.remove(index);
        if index == self.active {
            self.active = 0;
        } else if index < self.active {
            self.active -= 1;
        }
        removed
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
