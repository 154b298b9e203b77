use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    dates,
    error::{ApiError, ApiResult},
    expenses::{
        dto::{CreateExpenseRequest, CreatedExpense, ExpenseDetails},
        repo::ExpenseRepo,
        repo_types::{Expense, ExpenseParticipant, NewExpense},
        split::{allocate, SplitRule, SplitType},
    },
    groups::repo::GroupRepo,
    inbox::{
        repo::InboxRepo,
        repo_types::{NewNotification, NotificationKind},
    },
    payments::{repo::PaymentRepo, services::payment_requests},
    store::Store,
    users::repo::UserRepo,
};

fn dedup_keep_order(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Validates and records an expense paid by `payer`, then fans out payment
/// requests and notifications. Earlier inserts are not undone when a later
/// one fails.
#[instrument(skip(store, req), fields(amount = req.amount))]
pub async fn create_expense(
    store: &dyn Store,
    payer: Uuid,
    req: CreateExpenseRequest,
) -> ApiResult<CreatedExpense> {
    let split_type: SplitType = req.split_type.as_deref().unwrap_or_default().parse()?;
    let members = dedup_keep_order(&req.member_ids);

    let expense_date = req.expense_date.unwrap_or_else(dates::today);
    if expense_date > dates::today() {
        return Err(ApiError::bad_request("Expense date cannot be in the future."));
    }

    if let Some(group_id) = req.group_id {
        let group = store
            .get_group(group_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Group not found"))?;
        if !group.has_member(payer) {
            return Err(ApiError::Forbidden("You are not a member of this group".into()));
        }
        if let Some(outsider) = members.iter().find(|m| !group.has_member(**m)) {
            warn!(%group_id, member_id = %outsider, "participant outside group");
            return Err(ApiError::bad_request(
                "All participants must be members of the group.",
            ));
        }
    }

    let rule = SplitRule::new(
        split_type,
        req.custom_amounts.as_deref(),
        req.custom_percentages.as_deref(),
    )?;
    let shares = allocate(req.amount, &members, rule)?;

    let expense = store
        .insert_expense(NewExpense {
            user_id: payer,
            group_id: req.group_id,
            amount: req.amount,
            description: non_empty(req.description),
            expense_type: non_empty(req.expense_type),
            expense_date,
            split_type,
        })
        .await?;

    let rows: Vec<ExpenseParticipant> = shares
        .into_iter()
        .map(|s| ExpenseParticipant {
            expense_id: expense.id,
            member_id: s.member,
            share: s.amount,
        })
        .collect();
    let participants = store.insert_participants(&rows).await?;

    let requests = payment_requests(&expense, &participants);
    let payments = if requests.is_empty() {
        Vec::new()
    } else {
        store.insert_payments(&requests).await?
    };

    notify_participants(store, &expense, &participants).await?;

    info!(
        expense_id = %expense.id,
        participants = participants.len(),
        payments = payments.len(),
        "expense created"
    );
    Ok(CreatedExpense {
        expense,
        participants,
        payments,
    })
}

async fn notify_participants(
    store: &dyn Store,
    expense: &Expense,
    participants: &[ExpenseParticipant],
) -> anyhow::Result<()> {
    let payer_name = store
        .get_user(expense.user_id)
        .await?
        .map(|u| u.display_name())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Someone".into());
    let label = expense.description.as_deref().unwrap_or("an expense");

    let rows: Vec<NewNotification> = participants
        .iter()
        .filter(|p| p.member_id != expense.user_id)
        .map(|p| {
            let (kind, message) = if p.share > 0.0 {
                (
                    NotificationKind::PaymentRequested,
                    format!("{payer_name} requested {:.2} for {label}", p.share),
                )
            } else {
                (
                    NotificationKind::ExpenseAdded,
                    format!("{payer_name} added you to {label}"),
                )
            };
            NewNotification {
                user_id: p.member_id,
                from_user_id: Some(expense.user_id),
                kind,
                message,
            }
        })
        .collect();

    if rows.is_empty() {
        return Ok(());
    }
    store.insert_notifications(&rows).await
}

/// An expense with its participant rows, visible to the creator and participants only.
pub async fn expense_details(
    store: &dyn Store,
    viewer: Uuid,
    expense_id: Uuid,
) -> ApiResult<ExpenseDetails> {
    let not_found = || ApiError::not_found("Expense not found");
    let expense = store.get_expense(expense_id).await?.ok_or_else(not_found)?;
    let participants = store.participants_for_expenses(&[expense_id]).await?;

    let visible =
        expense.user_id == viewer || participants.iter().any(|p| p.member_id == viewer);
    if !visible {
        return Err(not_found());
    }
    Ok(ExpenseDetails {
        expense,
        participants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(dedup_keep_order(&[a, b, a, b]), vec![a, b]);
    }

    #[test]
    fn blank_strings_become_none() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" Taxi ".into())).as_deref(), Some("Taxi"));
        assert_eq!(non_empty(None), None);
    }
}
