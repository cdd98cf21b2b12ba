pub mod layout;
pub mod models;
pub mod replay;
pub mod settings;
pub mod utils;
