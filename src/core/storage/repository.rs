use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{debug, warn};

use super::models::SettingRecord;
use crate::core::i18n::Language;

pub const LANGUAGE_KEY: &str = "language";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Key/value settings table. Only the language preference lives here.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        let record = sqlx::query_as::<_, SettingRecord>(
            r#"
            SELECT key, value, updated_at
            FROM settings
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(|row| row.value))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
              value = excluded.value,
              updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Saved language, or the default when nothing usable is stored.
    pub async fn load_language(&self) -> Result<Language, StorageError> {
        let Some(code) = self.get_setting(LANGUAGE_KEY).await? else {
            return Ok(Language::default());
        };
        match Language::from_code(&code) {
            Some(language) => Ok(language),
            None => {
                warn!(%code, "ignoring unsupported saved language");
                Ok(Language::default())
            }
        }
    }

    pub async fn save_language(&self, language: Language) -> Result<(), StorageError> {
        self.set_setting(LANGUAGE_KEY, language.code()).await?;
        debug!(language = language.code(), "language preference saved");
        Ok(())
    }
}
