//! Settings DTOs and migrations

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use delegant_core::error::Result;
use delegant_core::settings::{DEFAULT_LOCAL_ENDPOINT, ProviderKind, Settings};

/// Record name of the settings table and of its migration path.
pub const SETTINGS_ENTITY: &str = "settings";

/// Version stamped on records written by this build.
pub const CURRENT_SETTINGS_VERSION: &str = "2.0.0";

/// Settings V1.0.0: cloud providers only.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(default)]
pub struct SettingsV1_0_0 {
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub openrouter_api_key: String,
    pub provider: String,
    pub model: String,
    pub display_width: u32,
    pub display_height: u32,
    pub shell_timeout_secs: u64,
    pub setup_complete: bool,
}

impl Default for SettingsV1_0_0 {
    fn default() -> Self {
        let defaults = Settings::default();
        Self {
            anthropic_api_key: defaults.anthropic_api_key,
            openai_api_key: defaults.openai_api_key,
            openrouter_api_key: defaults.openrouter_api_key,
            provider: defaults.provider.to_string(),
            model: defaults.model,
            display_width: defaults.display_width,
            display_height: defaults.display_height,
            shell_timeout_secs: defaults.shell_timeout_secs,
            setup_complete: defaults.setup_complete,
        }
    }
}

/// Settings V2.0.0: adds the local model server credential and endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
#[serde(default)]
pub struct SettingsV2_0_0 {
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub openrouter_api_key: String,
    pub ollama_api_key: String,
    pub ollama_base_url: String,
    pub provider: String,
    pub model: String,
    pub display_width: u32,
    pub display_height: u32,
    pub shell_timeout_secs: u64,
    pub setup_complete: bool,
}

/// Type alias for the latest Settings version.
pub type SettingsDTO = SettingsV2_0_0;

impl Default for SettingsV2_0_0 {
    fn default() -> Self {
        Self::from_domain(Settings::default())
    }
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from SettingsV1_0_0 to SettingsV2_0_0.
impl MigratesTo<SettingsV2_0_0> for SettingsV1_0_0 {
    fn migrate(self) -> SettingsV2_0_0 {
        SettingsV2_0_0 {
            anthropic_api_key: self.anthropic_api_key,
            openai_api_key: self.openai_api_key,
            openrouter_api_key: self.openrouter_api_key,
            ollama_api_key: String::new(),
            ollama_base_url: DEFAULT_LOCAL_ENDPOINT.to_string(),
            provider: self.provider,
            model: self.model,
            display_width: self.display_width,
            display_height: self.display_height,
            shell_timeout_secs: self.shell_timeout_secs,
            setup_complete: self.setup_complete,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

/// Convert SettingsV2_0_0 DTO to domain model.
///
/// Unknown provider names fall back to the default provider; zero display
/// sizes fall back to the defaults.
impl IntoDomain<Settings> for SettingsV2_0_0 {
    fn into_domain(self) -> Settings {
        let defaults = Settings::default();
        let provider = ProviderKind::from_str(&self.provider).unwrap_or_else(|_| {
            tracing::warn!(
                "[SettingsDTO] Unknown provider '{}', using {}",
                self.provider,
                defaults.provider
            );
            defaults.provider
        });

        Settings {
            anthropic_api_key: self.anthropic_api_key,
            openai_api_key: self.openai_api_key,
            openrouter_api_key: self.openrouter_api_key,
            ollama_api_key: self.ollama_api_key,
            ollama_base_url: self.ollama_base_url,
            provider,
            model: self.model,
            display_width: nonzero_or(self.display_width, defaults.display_width),
            display_height: nonzero_or(self.display_height, defaults.display_height),
            shell_timeout_secs: self.shell_timeout_secs,
            setup_complete: self.setup_complete,
        }
    }
}

/// Convert domain model to SettingsV2_0_0 DTO for persistence.
impl FromDomain<Settings> for SettingsV2_0_0 {
    fn from_domain(settings: Settings) -> Self {
        SettingsV2_0_0 {
            anthropic_api_key: settings.anthropic_api_key,
            openai_api_key: settings.openai_api_key,
            openrouter_api_key: settings.openrouter_api_key,
            ollama_api_key: settings.ollama_api_key,
            ollama_base_url: settings.ollama_base_url,
            provider: settings.provider.to_string(),
            model: settings.model,
            display_width: settings.display_width,
            display_height: settings.display_height,
            shell_timeout_secs: settings.shell_timeout_secs,
            setup_complete: settings.setup_complete,
        }
    }
}

fn nonzero_or(value: u32, fallback: u32) -> u32 {
    if value == 0 { fallback } else { value }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for Settings records.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: adds `ollama_api_key` (empty) and `ollama_base_url` (local default)
/// - V2.0.0 → Settings: converts DTO to domain model
pub fn create_settings_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    let settings_path = version_migrate::Migrator::define(SETTINGS_ENTITY)
        .from::<SettingsV1_0_0>()
        .step::<SettingsV2_0_0>()
        .into_with_save::<Settings>();

    migrator.register(settings_path)?;

    Ok(migrator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_record_migrates_to_domain() {
        let migrator = create_settings_migrator().unwrap();

        let toml_str = r#"
version = "1.0.0"
anthropic_api_key = "sk-ant"
provider = "anthropic"
model = "claude-opus-4-6"
display_width = 1920
display_height = 1080
shell_timeout_secs = 45
setup_complete = true
"#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();

        let settings: Settings = migrator
            .load_flat_from(SETTINGS_ENTITY, toml_value)
            .unwrap();
        assert_eq!(settings.anthropic_api_key, "sk-ant");
        assert_eq!(settings.model, "claude-opus-4-6");
        assert_eq!(settings.shell_timeout_secs, 45);
        assert_eq!(settings.ollama_base_url, DEFAULT_LOCAL_ENDPOINT);
        assert!(settings.ollama_api_key.is_empty());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let migrator = create_settings_migrator().unwrap();
        let value = serde_json::json!({
            "version": "2.0.0",
            "openrouter_api_key": "or-1",
            "provider": "openrouter"
        });

        let settings: Settings = migrator.load_flat_from(SETTINGS_ENTITY, value).unwrap();
        assert_eq!(settings.provider, ProviderKind::OpenRouter);
        assert_eq!(settings.active_credential(), "or-1");
        assert_eq!(settings.display_width, 1280);
        assert_eq!(settings.model, "claude-sonnet-4-6");
    }

    #[test]
    fn test_unknown_provider_falls_back_to_default() {
        let dto = SettingsV2_0_0 {
            provider: "gemini".to_string(),
            display_width: 0,
            ..Default::default()
        };
        let settings = dto.into_domain();
        assert_eq!(settings.provider, ProviderKind::Anthropic);
        assert_eq!(settings.display_width, 1280);
    }

    #[test]
    fn test_save_stamps_current_version() {
        let migrator = create_settings_migrator().unwrap();
        let settings = Settings {
            model: "o3".to_string(),
            provider: ProviderKind::OpenAi,
            ..Default::default()
        };

        let json_str = migrator
            .save_domain_flat(SETTINGS_ENTITY, settings)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert_eq!(value["version"], CURRENT_SETTINGS_VERSION);
        assert_eq!(value["provider"], "openai");
        assert_eq!(value["model"], "o3");
    }
}
