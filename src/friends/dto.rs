use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct FriendQuery {
    pub q: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFriendRequest {
    pub username: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// A friend link joined with the friend's profile.
#[derive(Debug, Clone, Serialize)]
pub struct FriendRecord {
    pub id: Uuid,
    pub friend_id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct FriendList {
    pub friends: Vec<FriendRecord>,
}

#[derive(Debug, Serialize)]
pub struct FriendAdded {
    pub message: &'static str,
    pub friend: FriendRecord,
}

#[derive(Debug, Serialize)]
pub struct FriendTags {
    pub groups: Vec<String>,
}
