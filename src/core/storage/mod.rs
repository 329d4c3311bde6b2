pub mod models;
pub mod repository;

pub use repository::{SettingsRepository, StorageError, LANGUAGE_KEY};
