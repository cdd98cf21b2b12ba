//! Adapters for the Delegant collaborator traits.
//!
//! - [`settings_repository::TomlSettingsRepository`]: versioned `settings.toml`
//! - [`catalog`]: HTTP model listers for the cloud providers
//! - [`event_hub::EventHub`]: in-process backend event channel
//! - [`detached_backend::DetachedBackend`]: backend without an execution engine
//! - [`headless_window::HeadlessWindow`]: host window kept in memory

pub mod catalog;
pub mod detached_backend;
pub mod dto;
pub mod event_hub;
pub mod headless_window;
pub mod paths;
pub mod settings_repository;
pub mod storage;

pub use detached_backend::DetachedBackend;
pub use event_hub::EventHub;
pub use headless_window::{HeadlessWindow, WindowSnapshot};
pub use paths::DelegantPaths;
pub use settings_repository::TomlSettingsRepository;
