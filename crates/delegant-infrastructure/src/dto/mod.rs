//! Versioned on-disk representations.

pub mod settings;

pub use settings::{
    CURRENT_SETTINGS_VERSION, SETTINGS_ENTITY, SettingsDTO, SettingsV1_0_0, SettingsV2_0_0,
    create_settings_migrator,
};
