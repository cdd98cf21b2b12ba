//! File storage primitives.

pub mod settings_file;

pub use settings_file::SettingsFile;
