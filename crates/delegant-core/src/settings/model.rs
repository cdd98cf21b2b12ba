//! Settings domain model.

use serde::{Deserialize, Serialize};

use super::provider::{DEFAULT_LOCAL_ENDPOINT, ProviderKind, ProviderProfile};
use crate::catalog::CatalogRequest;

/// Default model selected on first start.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";
/// Default agent display width in pixels.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 1280;
/// Default agent display height in pixels.
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 800;
/// Default shell command timeout.
pub const DEFAULT_SHELL_TIMEOUT_SECS: u64 = 30;

/// Process-wide user configuration.
///
/// The active credential is always the one keyed by `provider`; use
/// [`Settings::active_credential`] instead of reading a field directly.
/// Missing fields deserialize to their defaults, so partial records coming
/// from the backend merge cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub openrouter_api_key: String,
    pub ollama_api_key: String,
    pub ollama_base_url: String,
    pub provider: ProviderKind,
    pub model: String,
    pub display_width: u32,
    pub display_height: u32,
    pub shell_timeout_secs: u64,
    pub setup_complete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            openai_api_key: String::new(),
            openrouter_api_key: String::new(),
            ollama_api_key: String::new(),
            ollama_base_url: DEFAULT_LOCAL_ENDPOINT.to_string(),
            provider: ProviderKind::default(),
            model: DEFAULT_MODEL.to_string(),
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            shell_timeout_secs: DEFAULT_SHELL_TIMEOUT_SECS,
            setup_complete: false,
        }
    }
}

impl Settings {
    /// Strategy entry for the selected provider.
    pub fn profile(&self) -> &'static ProviderProfile {
        self.provider.profile()
    }

    /// Credential for an arbitrary provider.
    pub fn credential(&self, kind: ProviderKind) -> &str {
        kind.profile().credential(self)
    }

    /// Credential of the selected provider.
    pub fn active_credential(&self) -> &str {
        self.credential(self.provider)
    }

    /// Replaces the credential of `kind`.
    pub fn set_credential(&mut self, kind: ProviderKind, value: impl Into<String>) {
        *kind.profile().credential_mut(self) = value.into();
    }

    /// True when the selected provider can be used as configured.
    ///
    /// Whitespace-only credentials count as missing.
    pub fn has_usable_credential(&self) -> bool {
        self.profile().credential_optional || !self.active_credential().trim().is_empty()
    }

    /// True when any provider has a non-empty credential stored.
    pub fn has_any_credential(&self) -> bool {
        ProviderKind::all().any(|kind| !self.credential(kind).is_empty())
    }

    /// Marks setup complete for records saved before the setup flag existed.
    ///
    /// Returns `true` when the flag was changed.
    pub fn apply_legacy_setup_migration(&mut self) -> bool {
        if !self.setup_complete && self.has_any_credential() {
            self.setup_complete = true;
            return true;
        }
        false
    }

    /// Merges a partial update.
    ///
    /// Returns the names of fields that were rejected (zero display sizes).
    pub fn apply(&mut self, patch: SettingsPatch) -> Vec<&'static str> {
        let mut rejected = Vec::new();

        if let Some(provider) = patch.provider {
            self.provider = provider;
        }
        if let Some(key) = patch.anthropic_api_key {
            self.anthropic_api_key = key;
        }
        if let Some(key) = patch.openai_api_key {
            self.openai_api_key = key;
        }
        if let Some(key) = patch.openrouter_api_key {
            self.openrouter_api_key = key;
        }
        if let Some(key) = patch.ollama_api_key {
            self.ollama_api_key = key;
        }
        if let Some(url) = patch.ollama_base_url {
            self.ollama_base_url = url;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        match patch.display_width {
            Some(0) => rejected.push("display_width"),
            Some(width) => self.display_width = width,
            None => {}
        }
        match patch.display_height {
            Some(0) => rejected.push("display_height"),
            Some(height) => self.display_height = height,
            None => {}
        }
        if let Some(timeout) = patch.shell_timeout_secs {
            self.shell_timeout_secs = timeout;
        }
        if let Some(done) = patch.setup_complete {
            self.setup_complete = done;
        }

        rejected
    }

    /// Builds the catalog query for the selected provider.
    pub fn catalog_request(&self) -> CatalogRequest {
        let profile = self.profile();
        CatalogRequest {
            provider: self.provider,
            credential: self.active_credential().to_string(),
            endpoint: profile.endpoint(self),
        }
    }
}

/// Partial settings update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub provider: Option<ProviderKind>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub ollama_api_key: Option<String>,
    pub ollama_base_url: Option<String>,
    pub model: Option<String>,
    pub display_width: Option<u32>,
    pub display_height: Option<u32>,
    pub shell_timeout_secs: Option<u64>,
    pub setup_complete: Option<bool>,
}

impl SettingsPatch {
    /// Patch that sets only the credential of `kind`.
    pub fn credential(kind: ProviderKind, value: impl Into<String>) -> Self {
        let mut patch = Self::default();
        *kind.profile().credential_patch(&mut patch) = Some(value.into());
        patch
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
