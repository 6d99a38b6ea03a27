//! Session history and favorites

pub mod favorites;
pub mod store;

pub use favorites::{FavoriteEntry, FavoriteOrigin, FavoritesStore, ToggleOutcome};
pub use store::{HistoryEntry, HistoryMetadata, HistoryStore};
