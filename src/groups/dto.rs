use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::groups::repo_types::Group;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub friend_link_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MemberProfile {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GroupDetails {
    #[serde(flatten)]
    pub group: Group,
    pub member_profiles: Vec<MemberProfile>,
}
