use std::collections::HashMap;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    expenses::repo::ExpenseRepo,
    groups::repo::GroupRepo,
    history::ledger::Ledger,
    store::Store,
    users::repo::UserRepo,
};

fn sorted_unique(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort();
    ids.dedup();
    ids
}

/// Fetches every row the history derivation needs for `user_id`.
#[instrument(skip(store))]
pub async fn load_ledger(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Ledger> {
    let created = store.expenses_by_creator(user_id).await?;
    let mine = store.participants_for_member(user_id).await?;
    let joined_ids = sorted_unique(mine.iter().map(|p| p.expense_id).collect());
    let joined = store.expenses_by_ids(&joined_ids).await?;

    let all_ids = sorted_unique(
        created
            .iter()
            .map(|e| e.id)
            .chain(joined_ids.iter().copied())
            .collect(),
    );
    let participants = store.participants_for_expenses(&all_ids).await?;

    let group_ids = sorted_unique(
        created
            .iter()
            .chain(joined.iter())
            .filter_map(|e| e.group_id)
            .collect(),
    );
    let group_names: HashMap<Uuid, String> = store
        .groups_by_ids(&group_ids)
        .await?
        .into_iter()
        .map(|g| (g.id, g.name))
        .collect();

    let user_ids = sorted_unique(
        joined
            .iter()
            .map(|e| e.user_id)
            .chain(participants.iter().map(|p| p.member_id))
            .chain(std::iter::once(user_id))
            .collect(),
    );
    let user_names = display_names(store, &user_ids).await?;

    debug!(
        created = created.len(),
        joined = joined.len(),
        participants = participants.len(),
        "ledger loaded"
    );
    Ok(Ledger {
        user_id,
        created,
        joined,
        participants,
        group_names,
        user_names,
    })
}

pub async fn display_names(
    store: &dyn Store,
    ids: &[Uuid],
) -> anyhow::Result<HashMap<Uuid, String>> {
    Ok(store
        .users_by_ids(ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.display_name()))
        .collect())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Greeting name for the dashboard: profile name, then token metadata, then
/// the email local part.
pub async fn first_name(store: &dyn Store, user: &CurrentUser) -> anyhow::Result<String> {
    let profile_name = store
        .get_user(user.id)
        .await?
        .and_then(|u| u.name)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if let Some(name) = profile_name {
        return Ok(name.split(' ').next().unwrap_or_default().to_string());
    }
    Ok(fallback_first_name(user))
}

fn fallback_first_name(user: &CurrentUser) -> String {
    if let Some(raw) = user.metadata_name() {
        // "ann.lee" style handles lose everything after the dot
        let base = if raw.contains('.') && !raw.contains(' ') {
            raw.split('.').next()
        } else {
            raw.split(' ').next()
        };
        return base
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(capitalize)
            .unwrap_or_else(|| "Friend".into());
    }

    user.email
        .as_deref()
        .and_then(|e| e.split('@').next())
        .filter(|local| !local.is_empty())
        .map(capitalize)
        .unwrap_or_else(|| "Friend".into())
}
