use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    expenses::{
        repo::ExpenseRepo,
        repo_types::{Expense, ExpenseParticipant},
        split::round2,
    },
    payments::{
        dto::{PaymentSummary, PaymentView},
        repo::PaymentRepo,
        repo_types::{NewPayment, Payment, PaymentStatus},
    },
    store::Store,
};

/// One request per participant other than the payer who owes a non-zero share.
pub fn payment_requests(expense: &Expense, shares: &[ExpenseParticipant]) -> Vec<NewPayment> {
    shares
        .iter()
        .filter(|p| p.member_id != expense.user_id && p.share > 0.0)
        .map(|p| NewPayment {
            expense_id: expense.id,
            group_id: expense.group_id,
            from_user_id: expense.user_id,
            to_user_id: p.member_id,
            amount: p.share,
        })
        .collect()
}

/// Moves a payment from `requested` to `paid`. Only the debtor may do this.
#[instrument(skip(store))]
pub async fn mark_paid(
    store: &dyn Store,
    caller: Uuid,
    payment_id: Uuid,
    paid_via: Option<&str>,
) -> ApiResult<Payment> {
    let payment = store
        .get_payment(payment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment not found"))?;

    if payment.to_user_id != caller {
        warn!(%payment_id, %caller, "mark_paid by non-debtor");
        return Err(ApiError::Forbidden(
            "Only the person who owes this payment can mark it paid".into(),
        ));
    }
    if payment.status != PaymentStatus::Requested {
        return Err(ApiError::Conflict("Payment is in an invalid state".into()));
    }

    let paid_via = paid_via.map(str::trim).filter(|v| !v.is_empty());
    let updated = store
        .mark_payment_paid(payment_id, OffsetDateTime::now_utc(), paid_via)
        .await?
        // lost a race with another request
        .ok_or_else(|| ApiError::Conflict("Payment is in an invalid state".into()))?;

    info!(%payment_id, amount = updated.amount, "payment marked paid");
    Ok(updated)
}

async fn with_expense_names(
    store: &dyn Store,
    payments: Vec<Payment>,
) -> anyhow::Result<Vec<PaymentView>> {
    let mut ids: Vec<Uuid> = payments.iter().filter_map(|p| p.expense_id).collect();
    ids.sort();
    ids.dedup();
    let names: HashMap<Uuid, String> = store
        .expenses_by_ids(&ids)
        .await?
        .into_iter()
        .map(|e| (e.id, e.description.unwrap_or_default()))
        .collect();

    Ok(payments
        .into_iter()
        .map(|p| {
            let expense_name = p
                .expense_id
                .and_then(|id| names.get(&id).cloned())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Expense".into());
            PaymentView {
                payment: p,
                expense_name,
            }
        })
        .collect())
}

/// Requests the user still has to pay.
pub async fn outstanding(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Vec<PaymentView>> {
    let rows = store
        .payments_for_user(user_id)
        .await?
        .into_iter()
        .filter(|p| p.to_user_id == user_id && p.status == PaymentStatus::Requested)
        .collect();
    with_expense_names(store, rows).await
}

/// Settled payments on either side.
pub async fn past(store: &dyn Store, user_id: Uuid) -> anyhow::Result<Vec<PaymentView>> {
    let rows = store
        .payments_for_user(user_id)
        .await?
        .into_iter()
        .filter(|p| p.status == PaymentStatus::Paid)
        .collect();
    with_expense_names(store, rows).await
}

pub async fn summary(store: &dyn Store, user_id: Uuid) -> anyhow::Result<PaymentSummary> {
    let rows = store.payments_for_user(user_id).await?;
    Ok(summarize(user_id, &rows))
}

pub fn summarize(user_id: Uuid, rows: &[Payment]) -> PaymentSummary {
    let open = rows.iter().filter(|p| p.status == PaymentStatus::Requested);
    let (mut by_user, mut to_user) = (0.0, 0.0);
    for p in open {
        if p.to_user_id == user_id {
            by_user += p.amount;
        } else if p.from_user_id == user_id {
            to_user += p.amount;
        }
    }
    PaymentSummary {
        amount_owed_by_user: round2(by_user),
        amount_owed_to_user: round2(to_user),
    }
}
