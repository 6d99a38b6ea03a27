//! Image Generation Studio
//!
//! A multi-provider image generation client. Named provider profiles, a
//! bounded generation history and a favorites list live in isolated,
//! in-memory sessions; generation calls go through one provider adapter with
//! bounded retry on transient failures.

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod profile;
pub mod provider;
pub mod response;
pub mod session;
pub mod styles;

pub use error::{AppError, Result};
pub use session::SessionManager;
