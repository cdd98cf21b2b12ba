//! First-run setup wizard steps and their gates.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

use super::model::Settings;

/// A credential must be longer than this to pass the credential step.
pub const MIN_CREDENTIAL_LEN: usize = 10;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Welcome,
    Provider,
    Credential,
    Display,
    Ready,
}

impl WizardStep {
    pub fn all() -> impl Iterator<Item = WizardStep> {
        WizardStep::iter()
    }

    /// The following step; `None` on the last one.
    pub fn next(self) -> Option<WizardStep> {
        WizardStep::iter().skip_while(|step| *step != self).nth(1)
    }

    /// The preceding step; `None` on the first one.
    pub fn previous(self) -> Option<WizardStep> {
        WizardStep::iter().take_while(|step| *step != self).last()
    }

    /// Whether "Next" is enabled on this step for `settings`.
    ///
    /// The credential step requires more than [`MIN_CREDENTIAL_LEN`]
    /// characters unless the selected provider works without one. The
    /// display step requires a non-zero size. Every other step is open.
    pub fn can_proceed(self, settings: &Settings) -> bool {
        match self {
            WizardStep::Credential => {
                settings.profile().credential_optional
                    || settings.active_credential().chars().count() > MIN_CREDENTIAL_LEN
            }
            WizardStep::Display => settings.display_width > 0 && settings.display_height > 0,
            _ => true,
        }
    }

    /// Intermediate steps may be skipped, except the credential step.
    pub fn can_skip(self) -> bool {
        !matches!(
            self,
            WizardStep::Welcome | WizardStep::Credential | WizardStep::Ready
        )
    }
}
