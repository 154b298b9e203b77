use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    friends::repo::FriendRepo,
    groups::{
        dto::{CreateGroupRequest, GroupDetails, MemberProfile, UpdateGroupRequest},
        repo::GroupRepo,
        repo_types::{Group, NewGroup},
    },
    inbox::{
        repo::InboxRepo,
        repo_types::{NewNotification, NotificationKind},
    },
    store::Store,
    users::repo::UserRepo,
};

fn required_name(raw: &str) -> ApiResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Group name is required."));
    }
    Ok(name.to_string())
}

fn clean_description(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|d| !d.is_empty()).map(str::to_string)
}

async fn notify_added(
    store: &dyn Store,
    actor: Uuid,
    group: &Group,
    added: &[Uuid],
) -> anyhow::Result<()> {
    if added.is_empty() {
        return Ok(());
    }
    let actor_name = store
        .get_user(actor)
        .await?
        .map(|u| u.display_name())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Someone".into());
    let rows: Vec<NewNotification> = added
        .iter()
        .map(|member| NewNotification {
            user_id: *member,
            from_user_id: Some(actor),
            kind: NotificationKind::GroupAdded,
            message: format!("{actor_name} added you to {}", group.name),
        })
        .collect();
    store.insert_notifications(&rows).await
}

#[instrument(skip(store, req))]
pub async fn create_group(
    store: &dyn Store,
    owner: Uuid,
    req: CreateGroupRequest,
) -> ApiResult<Group> {
    let name = required_name(&req.name)?;
    let mut members = vec![owner];
    for id in req.member_ids {
        if !members.contains(&id) {
            members.push(id);
        }
    }

    let group = store
        .create_group(NewGroup {
            name,
            description: clean_description(req.description.as_deref()),
            members,
            owner_id: owner,
        })
        .await?;

    notify_added(store, owner, &group, &group.members[1..]).await?;
    info!(group_id = %group.id, members = group.members.len(), "group created");
    Ok(group)
}

/// Loads a group the caller belongs to.
pub async fn member_group(store: &dyn Store, user_id: Uuid, group_id: Uuid) -> ApiResult<Group> {
    let group = store
        .get_group(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;
    if !group.has_member(user_id) {
        return Err(ApiError::Forbidden("You are not a member of this group".into()));
    }
    Ok(group)
}

pub async fn group_details(
    store: &dyn Store,
    user_id: Uuid,
    group_id: Uuid,
) -> ApiResult<GroupDetails> {
    let group = member_group(store, user_id, group_id).await?;
    let profiles = store.users_by_ids(&group.members).await?;
    let member_profiles = group
        .members
        .iter()
        .filter_map(|id| profiles.iter().find(|p| p.id == *id))
        .map(|p| MemberProfile {
            id: p.id,
            name: p.display_name(),
            username: p.username.clone().unwrap_or_default(),
        })
        .collect();
    Ok(GroupDetails {
        group,
        member_profiles,
    })
}

#[instrument(skip(store, req))]
pub async fn update_group(
    store: &dyn Store,
    user_id: Uuid,
    group_id: Uuid,
    req: UpdateGroupRequest,
) -> ApiResult<Group> {
    member_group(store, user_id, group_id).await?;
    let name = required_name(&req.name)?;
    let description = clean_description(req.description.as_deref());
    store
        .update_group(group_id, &name, description.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))
}

/// Adds the friend behind one of the caller's friend links. Adding someone
/// who is already a member is a no-op.
#[instrument(skip(store))]
pub async fn add_member(
    store: &dyn Store,
    user_id: Uuid,
    group_id: Uuid,
    friend_link_id: Uuid,
) -> ApiResult<Group> {
    let group = member_group(store, user_id, group_id).await?;
    let link = store
        .get_friend_link(friend_link_id)
        .await?
        .filter(|l| l.owner_id == user_id)
        .ok_or_else(|| ApiError::not_found("Friend not found"))?;

    if group.has_member(link.friend_id) {
        return Ok(group);
    }
    let mut members = group.members.clone();
    members.push(link.friend_id);
    let updated = store
        .set_group_members(group_id, &members)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    notify_added(store, user_id, &updated, &[link.friend_id]).await?;
    info!(%group_id, member_id = %link.friend_id, "member added");
    Ok(updated)
}

#[instrument(skip(store))]
pub async fn leave_group(store: &dyn Store, user_id: Uuid, group_id: Uuid) -> ApiResult<()> {
    let group = member_group(store, user_id, group_id).await?;
    let members: Vec<Uuid> = group.members.into_iter().filter(|m| *m != user_id).collect();
    store.set_group_members(group_id, &members).await?;
    info!(%group_id, remaining = members.len(), "member left group");
    Ok(())
}
