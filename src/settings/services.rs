use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    settings::{
        repo::SettingsRepo,
        repo_types::{SettingsValues, UserSettings},
    },
    store::Store,
};

/// Returns the user's settings row, creating the default one on first read.
#[instrument(skip(store))]
pub async fn load_or_create(store: &dyn Store, user_id: Uuid) -> anyhow::Result<UserSettings> {
    if let Some(row) = store.get_settings(user_id).await? {
        return Ok(row);
    }
    debug!("creating default settings");
    store
        .insert_settings(user_id, &SettingsValues::default())
        .await
}

#[instrument(skip(store, values))]
pub async fn save(
    store: &dyn Store,
    user_id: Uuid,
    values: &SettingsValues,
) -> anyhow::Result<UserSettings> {
    match store.get_settings(user_id).await? {
        Some(row) => store
            .update_settings(row.id, values)
            .await?
            .ok_or_else(|| anyhow::anyhow!("settings row {} vanished during update", row.id)),
        None => store.insert_settings(user_id, values).await,
    }
}
