use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notifications_enabled: bool,
    pub theme: String,
    pub font_size: String,
}

/// The user-editable part of a settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsValues {
    pub notifications_enabled: bool,
    pub theme: String,
    pub font_size: String,
}

impl Default for SettingsValues {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            theme: "light".into(),
            font_size: "normal".into(),
        }
    }
}

impl From<UserSettings> for SettingsValues {
    fn from(s: UserSettings) -> Self {
        Self {
            notifications_enabled: s.notifications_enabled,
            theme: s.theme,
            font_size: s.font_size,
        }
    }
}
