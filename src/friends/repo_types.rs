use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendLink {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub friend_id: Uuid,
    pub note: Option<String>, // free-form tag, doubles as the friends-page group filter
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
