//! Provider profiles - named bundles of provider, endpoint and credentials

pub mod store;

use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

pub use store::ProfileStore;

/// How requests to the free-form provider authenticate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthMode {
    /// No header at all
    #[default]
    Anonymous,
    /// `Referer: {domain}`
    Referrer { domain: String },
    /// `Authorization: Bearer {token}`
    Token { token: String },
}

/// A named, saved provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub kind: ProviderKind,
    /// Empty means the provider's default endpoint
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Only consulted for the free-form provider
    #[serde(default)]
    pub auth: AuthMode,
    /// Set only by a successful connectivity check
    #[serde(default)]
    pub validated: bool,
}

impl Profile {
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url: String::new(),
            api_key: None,
            auth: AuthMode::Anonymous,
            validated: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    /// Endpoint without a trailing slash, falling back to the provider default
    pub fn endpoint(&self) -> &str {
        let url = self.base_url.trim();
        let url = if url.is_empty() {
            self.kind.default_base_url()
        } else {
            url
        };
        url.trim_end_matches('/')
    }

    /// API key if one is set and non-blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Copy safe to hand to the presentation layer
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = copy.api_key.as_deref().map(mask_secret);
        if let AuthMode::Token { token } = &mut copy.auth {
            *token = mask_secret(token);
        }
        copy
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("default", ProviderKind::Pollinations)
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
