//! Model provider strategy table.
//!
//! Every provider-specific branch (which credential is active, whether a
//! credential is required, which static models to show before a live query
//! returns, how to normalize an endpoint override) is answered by the
//! [`ProviderProfile`] registered for a [`ProviderKind`]. Adding a provider is
//! a new enum variant plus one table entry.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use super::model::{Settings, SettingsPatch};
use crate::catalog::ModelCatalogEntry;

/// Default address of the local model server.
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://127.0.0.1:11434";

/// The closed set of model-serving backends a user can select.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    OpenAi,
    OpenRouter,
    /// Local model server, reachable only through the backend.
    Ollama,
}

impl ProviderKind {
    /// Returns the strategy table entry for this provider.
    pub fn profile(self) -> &'static ProviderProfile {
        match self {
            ProviderKind::Anthropic => &ANTHROPIC,
            ProviderKind::OpenAi => &OPENAI,
            ProviderKind::OpenRouter => &OPENROUTER,
            ProviderKind::Ollama => &OLLAMA,
        }
    }

    /// All providers in display order.
    pub fn all() -> impl Iterator<Item = ProviderKind> {
        ProviderKind::iter()
    }

    /// True for the provider served from the user's machine.
    pub fn is_local(self) -> bool {
        self.profile().normalize_endpoint.is_some()
    }
}

/// A model shipped with the application, shown before a live catalog arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticModel {
    pub id: &'static str,
    pub label: &'static str,
}

/// Per-provider strategy entry.
pub struct ProviderProfile {
    pub kind: ProviderKind,
    /// Human-readable provider name.
    pub label: &'static str,
    /// Whether tasks and catalog queries may proceed without a credential.
    pub credential_optional: bool,
    /// Static model list, newest first.
    pub static_models: &'static [StaticModel],
    credential: fn(&Settings) -> &str,
    credential_mut: fn(&mut Settings) -> &mut String,
    credential_patch: fn(&mut SettingsPatch) -> &mut Option<String>,
    normalize_endpoint: Option<fn(&str) -> String>,
}

impl ProviderProfile {
    /// Reads this provider's credential from the settings.
    pub fn credential<'a>(&self, settings: &'a Settings) -> &'a str {
        (self.credential)(settings)
    }

    /// Mutable access to this provider's credential slot.
    pub fn credential_mut<'a>(&self, settings: &'a mut Settings) -> &'a mut String {
        (self.credential_mut)(settings)
    }

    /// The patch field carrying this provider's credential.
    pub fn credential_patch<'a>(&self, patch: &'a mut SettingsPatch) -> &'a mut Option<String> {
        (self.credential_patch)(patch)
    }

    /// Normalized endpoint for providers that accept an override.
    pub fn endpoint(&self, settings: &Settings) -> Option<String> {
        self.normalize_endpoint
            .map(|normalize| normalize(&settings.ollama_base_url))
    }

    /// Model selected when the user switches to this provider.
    pub fn default_model(&self) -> &'static str {
        self.static_models.first().map(|m| m.id).unwrap_or("")
    }

    /// The static model list as catalog entries.
    pub fn static_catalog(&self) -> Vec<ModelCatalogEntry> {
        self.static_models
            .iter()
            .map(|m| ModelCatalogEntry::new(m.id, m.label))
            .collect()
    }
}

impl std::fmt::Debug for ProviderProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderProfile")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("credential_optional", &self.credential_optional)
            .field("static_models", &self.static_models.len())
            .finish()
    }
}

/// Normalizes a local model server address.
///
/// Empty input yields [`DEFAULT_LOCAL_ENDPOINT`]; a missing scheme gets
/// `http://`; trailing slashes and one trailing `/v1` segment are removed.
pub fn normalize_local_endpoint(input: &str) -> String {
    let trimmed = input.trim();
    let mut url = if trimmed.is_empty() {
        DEFAULT_LOCAL_ENDPOINT.to_string()
    } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let stripped_len = url.trim_end_matches('/').len();
    url.truncate(stripped_len);

    if let Some(without_version) = url.strip_suffix("/v1") {
        url = without_version.trim_end_matches('/').to_string();
    }

    url
}

// ============================================================================
// Strategy table
// ============================================================================

fn anthropic_key(settings: &Settings) -> &str {
    &settings.anthropic_api_key
}

fn anthropic_key_mut(settings: &mut Settings) -> &mut String {
    &mut settings.anthropic_api_key
}

fn anthropic_key_patch(patch: &mut SettingsPatch) -> &mut Option<String> {
    &mut patch.anthropic_api_key
}

fn openai_key(settings: &Settings) -> &str {
    &settings.openai_api_key
}

fn openai_key_mut(settings: &mut Settings) -> &mut String {
    &mut settings.openai_api_key
}

fn openai_key_patch(patch: &mut SettingsPatch) -> &mut Option<String> {
    &mut patch.openai_api_key
}

fn openrouter_key(settings: &Settings) -> &str {
    &settings.openrouter_api_key
}

fn openrouter_key_mut(settings: &mut Settings) -> &mut String {
    &mut settings.openrouter_api_key
}

fn openrouter_key_patch(patch: &mut SettingsPatch) -> &mut Option<String> {
    &mut patch.openrouter_api_key
}

fn ollama_key(settings: &Settings) -> &str {
    &settings.ollama_api_key
}

fn ollama_key_mut(settings: &mut Settings) -> &mut String {
    &mut settings.ollama_api_key
}

fn ollama_key_patch(patch: &mut SettingsPatch) -> &mut Option<String> {
    &mut patch.ollama_api_key
}

static ANTHROPIC: ProviderProfile = ProviderProfile {
    kind: ProviderKind::Anthropic,
    label: "Anthropic",
    credential_optional: false,
    static_models: &[
        StaticModel { id: "claude-sonnet-4-6", label: "Claude Sonnet 4.6" },
        StaticModel { id: "claude-opus-4-6", label: "Claude Opus 4.6" },
        StaticModel { id: "claude-haiku-4-5", label: "Claude Haiku 4.5" },
        StaticModel { id: "claude-sonnet-4-5", label: "Claude Sonnet 4.5" },
        StaticModel { id: "claude-opus-4-5", label: "Claude Opus 4.5" },
    ],
    credential: anthropic_key,
    credential_mut: anthropic_key_mut,
    credential_patch: anthropic_key_patch,
    normalize_endpoint: None,
};

static OPENAI: ProviderProfile = ProviderProfile {
    kind: ProviderKind::OpenAi,
    label: "OpenAI",
    credential_optional: false,
    static_models: &[
        StaticModel { id: "gpt-4.1", label: "GPT-4.1" },
        StaticModel { id: "gpt-4.1-mini", label: "GPT-4.1 Mini" },
        StaticModel { id: "gpt-4.1-nano", label: "GPT-4.1 Nano" },
        StaticModel { id: "o3", label: "o3" },
        StaticModel { id: "o4-mini", label: "o4-mini" },
    ],
    credential: openai_key,
    credential_mut: openai_key_mut,
    credential_patch: openai_key_patch,
    normalize_endpoint: None,
};

static OPENROUTER: ProviderProfile = ProviderProfile {
    kind: ProviderKind::OpenRouter,
    label: "OpenRouter",
    credential_optional: false,
    static_models: &[
        StaticModel { id: "anthropic/claude-sonnet-4.6", label: "Claude Sonnet 4.6" },
        StaticModel { id: "anthropic/claude-opus-4.6", label: "Claude Opus 4.6" },
        StaticModel { id: "openai/gpt-4.1", label: "GPT-4.1" },
        StaticModel { id: "openai/gpt-4.1-mini", label: "GPT-4.1 Mini" },
        StaticModel { id: "google/gemini-2.5-pro", label: "Gemini 2.5 Pro" },
        StaticModel { id: "google/gemini-2.5-flash", label: "Gemini 2.5 Flash" },
        StaticModel { id: "meta-llama/llama-4-maverick", label: "Llama 4 Maverick" },
    ],
    credential: openrouter_key,
    credential_mut: openrouter_key_mut,
    credential_patch: openrouter_key_patch,
    normalize_endpoint: None,
};

static OLLAMA: ProviderProfile = ProviderProfile {
    kind: ProviderKind::Ollama,
    label: "Ollama",
    credential_optional: true,
    static_models: &[],
    credential: ollama_key,
    credential_mut: ollama_key_mut,
    credential_patch: ollama_key_patch,
    normalize_endpoint: Some(normalize_local_endpoint),
};
