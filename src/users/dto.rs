use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::UserProfile;

#[derive(Debug, Deserialize)]
pub struct AccountUpdate {
    pub full_name: String,
    pub username: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub display_currency: String,
}

#[derive(Debug, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub username: String,
    pub phone_number: String,
    pub display_currency: String,
}

impl From<UserProfile> for Account {
    fn from(u: UserProfile) -> Self {
        Self {
            id: u.id,
            email: u.email.unwrap_or_default(),
            full_name: u.name.unwrap_or_default(),
            username: u.username.unwrap_or_default(),
            phone_number: u.phone_number.unwrap_or_default(),
            display_currency: u.display_currency.unwrap_or_else(|| "USD".into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: Account,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
}

impl From<UserProfile> for PublicProfile {
    fn from(u: UserProfile) -> Self {
        Self {
            id: u.id,
            name: u.name.unwrap_or_default(),
            email: u.email.unwrap_or_default(),
            username: u.username.unwrap_or_default(),
        }
    }
}
