//! User configuration: settings model, provider strategy table, setup wizard, persistence trait.

pub mod model;
pub mod provider;
pub mod repository;
pub mod wizard;

pub use model::{Settings, SettingsPatch};
pub use provider::{
    DEFAULT_LOCAL_ENDPOINT, ProviderKind, ProviderProfile, StaticModel, normalize_local_endpoint,
};
pub use repository::SettingsRepository;
pub use wizard::{MIN_CREDENTIAL_LEN, WizardStep};
