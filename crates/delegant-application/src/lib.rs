//! Delegant application layer.
//!
//! Stores, services, and the backend event bridge that together keep the
//! front-end state consistent with the agent backend.

pub mod agent_session_store;
pub mod catalog;
pub mod context;
pub mod event_bridge;
pub mod geometry;
pub mod mode_coordinator;
pub mod settings_store;
pub mod task_launcher;
pub mod ui_store;

#[cfg(test)]
mod test_support;

pub use agent_session_store::AgentSessionStore;
pub use catalog::{CatalogEndpoints, CatalogTicket, CatalogView, LocalServerLister, ModelCatalogResolver};
pub use context::{
    AppContext, Collaborators, ContextOptions, LINUX_ACCESSIBILITY_WARNING, PendingCatalog,
    platform_warning,
};
pub use event_bridge::{EventBridge, MountedBridge, SubscriptionRegistry};
pub use geometry::WindowGeometryController;
pub use mode_coordinator::ModeCoordinator;
pub use settings_store::{SettingsState, SettingsStore};
pub use task_launcher::{SubmitOutcome, TaskLauncher};
pub use ui_store::{UiState, UiStore};
