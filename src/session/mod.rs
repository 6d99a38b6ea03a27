//! Session layer - isolated per-user state and the operations over it

pub mod manager;
pub mod state;

pub use manager::{
    FavoriteToggle, GenerateInput, ProfileListing, SessionManager, ValidationOutcome, VaryPrefill,
};
pub use state::{Session, SessionState};
