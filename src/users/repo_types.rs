use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `public.users`, the profile table mirrored from the auth service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub display_currency: Option<String>,
}

impl UserProfile {
    /// Name shown next to expenses; falls back to the username.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.username.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub username: String,
    pub phone_number: String,
    pub display_currency: String,
}
