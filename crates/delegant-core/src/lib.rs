//! Domain layer of the Delegant front-end.
//!
//! Holds the value types shared by every crate (settings, agent session, UI
//! mode, window geometry, model catalog, backend events) together with the
//! traits that abstract the external collaborators: the agent engine
//! ([`backend::AgentBackend`], [`event::EventSource`]), the settings store
//! ([`settings::SettingsRepository`]) and the native window
//! ([`window::HostWindow`]).

pub mod agent;
pub mod backend;
pub mod catalog;
pub mod error;
pub mod event;
pub mod settings;
pub mod ui;
pub mod window;

pub use error::DelegantError;
