//! Provider module - kinds, request types, adapter, and retry

pub mod adapter;
pub mod kind;
pub mod openai;
pub mod pollinations;
pub mod retry;
pub mod traits;
pub mod types;

pub use adapter::ProviderAdapter;
pub use kind::{Capabilities, ProviderKind};
pub use retry::RetryController;
pub use traits::GenerationBackend;
pub use types::{
    Geometry, GenerationRequest, GenerationResult, ImageRef, ProviderOptions,
    NEGATIVE_PROMPT_MARKER,
};
