use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::settings::repo_types::{SettingsValues, UserSettings};
use crate::store::postgres::PgStore;

#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn get_settings(&self, user_id: Uuid) -> anyhow::Result<Option<UserSettings>>;
    async fn insert_settings(
        &self,
        user_id: Uuid,
        values: &SettingsValues,
    ) -> anyhow::Result<UserSettings>;
    async fn update_settings(
        &self,
        id: Uuid,
        values: &SettingsValues,
    ) -> anyhow::Result<Option<UserSettings>>;
}

#[async_trait]
impl SettingsRepo for PgStore {
    async fn get_settings(&self, user_id: Uuid) -> anyhow::Result<Option<UserSettings>> {
        sqlx::query_as::<_, UserSettings>(
            r#"
            SELECT id, user_id, notifications_enabled, theme, font_size
              FROM settings
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .context("get settings")
    }

    async fn insert_settings(
        &self,
        user_id: Uuid,
        values: &SettingsValues,
    ) -> anyhow::Result<UserSettings> {
        sqlx::query_as::<_, UserSettings>(
            r#"
            INSERT INTO settings (id, user_id, notifications_enabled, theme, font_size)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, notifications_enabled, theme, font_size
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(values.notifications_enabled)
        .bind(&values.theme)
        .bind(&values.font_size)
        .fetch_one(self.pool())
        .await
        .context("insert settings")
    }

    async fn update_settings(
        &self,
        id: Uuid,
        values: &SettingsValues,
    ) -> anyhow::Result<Option<UserSettings>> {
        sqlx::query_as::<_, UserSettings>(
            r#"
            UPDATE settings
               SET notifications_enabled = $2, theme = $3, font_size = $4
             WHERE id = $1
            RETURNING id, user_id, notifications_enabled, theme, font_size
            "#,
        )
        .bind(id)
        .bind(values.notifications_enabled)
        .bind(&values.theme)
        .bind(&values.font_size)
        .fetch_optional(self.pool())
        .await
        .context("update settings")
    }
}
