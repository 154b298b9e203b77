use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    friends::{
        dto::{AddFriendRequest, FriendQuery, FriendRecord},
        repo::FriendRepo,
        repo_types::FriendLink,
    },
    store::Store,
    users::{repo::UserRepo, repo_types::UserProfile},
};

fn record(link: &FriendLink, profile: &UserProfile) -> FriendRecord {
    FriendRecord {
        id: link.id,
        friend_id: link.friend_id,
        name: profile.name.clone().unwrap_or_default(),
        username: profile.username.clone().unwrap_or_default(),
        email: profile.email.clone().unwrap_or_default(),
        note: link.note.clone().unwrap_or_default(),
    }
}

fn matches(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// The caller's friends, joined with profiles and sorted by name. Links whose
/// profile is gone are skipped.
pub async fn list_friends(
    store: &dyn Store,
    owner_id: Uuid,
    query: &FriendQuery,
) -> anyhow::Result<Vec<FriendRecord>> {
    let links = store.friend_links(owner_id).await?;
    if links.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = links.iter().map(|l| l.friend_id).collect();
    let profiles = store.users_by_ids(&ids).await?;

    let q = query.q.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
    let tag = query.group.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

    let mut out: Vec<FriendRecord> = links
        .iter()
        .filter_map(|l| profiles.iter().find(|p| p.id == l.friend_id).map(|p| record(l, p)))
        .filter(|r| {
            q.as_deref().map_or(true, |q| {
                matches(&r.name, q) || matches(&r.username, q) || matches(&r.email, q)
            })
        })
        .filter(|r| tag.as_deref().map_or(true, |t| matches(&r.note, t)))
        .collect();
    out.sort_by_key(|r| r.name.to_lowercase());
    Ok(out)
}

#[instrument(skip(store, req))]
pub async fn add_friend(
    store: &dyn Store,
    owner_id: Uuid,
    req: AddFriendRequest,
) -> ApiResult<FriendRecord> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }
    let profile = store
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if profile.id == owner_id {
        return Err(ApiError::bad_request("You cannot add yourself as a friend"));
    }
    if store.find_friend_link(owner_id, profile.id).await?.is_some() {
        return Err(ApiError::bad_request("This user is already in your friends list"));
    }

    let note = req.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let link = store.insert_friend_link(owner_id, profile.id, note).await?;
    info!(friend_id = %profile.id, "friend added");
    Ok(record(&link, &profile))
}

pub async fn remove_friend(store: &dyn Store, owner_id: Uuid, link_id: Uuid) -> ApiResult<()> {
    if !store.delete_friend_link(owner_id, link_id).await? {
        return Err(ApiError::not_found("Friend not found"));
    }
    Ok(())
}

/// Distinct note tags across the caller's friend links.
pub async fn friend_tags(store: &dyn Store, owner_id: Uuid) -> anyhow::Result<Vec<String>> {
    let notes = store.friend_links(owner_id).await?.into_iter().filter_map(|l| l.note);
    Ok(distinct_tags(notes))
}

/// Trimmed, non-empty tags sorted and deduplicated without regard to case.
/// The first spelling seen wins.
fn distinct_tags(notes: impl Iterator<Item = String>) -> Vec<String> {
    let mut tags: Vec<String> = notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    tags.sort_by_key(|t| t.to_lowercase());
    tags.dedup_by_key(|t| t.to_lowercase());
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(raw: &[&str]) -> Vec<String> {
        distinct_tags(raw.iter().map(|s| s.to_string()))
    }

    #[test]
    fn tags_dedupe_across_case() {
        assert_eq!(tags(&["Trip", "trip", "Trip"]), vec!["Trip"]);
        assert_eq!(
            tags(&["work", " Flat ", "TRIP", "", "flat", "trip"]),
            vec!["Flat", "TRIP", "work"]
        );
    }
}
