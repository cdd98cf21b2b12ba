//! UI mode state machine and toast notifications.
//!
//! The app is either the full start window or the compact taskbar; the
//! taskbar may additionally be expanded. Mode changes are driven only through
//! [`UiModeState::transition`], which encodes the full transition table.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Top-level presentation mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UiMode {
    /// Full start window (task entry).
    #[default]
    Start,
    /// Compact floating taskbar while the agent runs.
    Taskbar,
}

/// Inputs of the mode state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ModeTrigger {
    AgentStarted,
    AgentFinished,
    Expand,
    Collapse,
    Toggle,
}

/// Mode plus the taskbar's expanded sub-state.
///
/// `expanded` is only ever true in [`UiMode::Taskbar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UiModeState {
    pub mode: UiMode,
    pub expanded: bool,
}

impl UiModeState {
    pub const START: UiModeState = UiModeState {
        mode: UiMode::Start,
        expanded: false,
    };
    pub const TASKBAR: UiModeState = UiModeState {
        mode: UiMode::Taskbar,
        expanded: false,
    };
    pub const TASKBAR_EXPANDED: UiModeState = UiModeState {
        mode: UiMode::Taskbar,
        expanded: true,
    };

    /// Switches mode; always collapses.
    pub fn set_mode(&mut self, mode: UiMode) {
        self.mode = mode;
        self.expanded = false;
    }

    /// Sets the expanded flag. Expanding in start mode is ignored.
    ///
    /// Returns whether the request was honored.
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        if expanded && self.mode == UiMode::Start {
            return false;
        }
        self.expanded = expanded;
        true
    }

    /// Flips the expanded flag. Ignored in start mode.
    pub fn toggle_expanded(&mut self) -> bool {
        if self.mode == UiMode::Start {
            return false;
        }
        self.expanded = !self.expanded;
        true
    }

    /// Target state for `trigger`, or `None` when the pair is a no-op.
    pub fn next(&self, trigger: ModeTrigger) -> Option<UiModeState> {
        match (self.mode, self.expanded, trigger) {
            (_, _, ModeTrigger::AgentFinished) => Some(Self::START),
            (UiMode::Start, _, ModeTrigger::AgentStarted) => Some(Self::TASKBAR),
            (UiMode::Taskbar, false, ModeTrigger::Expand | ModeTrigger::Toggle) => {
                Some(Self::TASKBAR_EXPANDED)
            }
            (UiMode::Taskbar, true, ModeTrigger::Collapse | ModeTrigger::Toggle) => {
                Some(Self::TASKBAR)
            }
            _ => None,
        }
    }

    /// Applies the transition table in place.
    ///
    /// Returns `true` when the pair was a defined transition.
    pub fn transition(&mut self, trigger: ModeTrigger) -> bool {
        match self.next(trigger) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

/// Visual class of a toast.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToastSeverity {
    Error,
    Info,
    Success,
}

/// Transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub severity: ToastSeverity,
}

impl Toast {
    pub fn new(message: impl Into<String>, severity: ToastSeverity) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
        }
    }
}
