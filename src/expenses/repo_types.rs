use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::expenses::split::SplitType;

/// Expense row. `user_id` is the creator, who is also the payer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Option<Uuid>,
    pub amount: f64,
    pub description: Option<String>,
    pub expense_type: Option<String>,
    #[serde(with = "crate::dates::iso_date")]
    pub expense_date: Date,
    pub split_type: SplitType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseParticipant {
    pub expense_id: Uuid,
    pub member_id: Uuid,
    pub share: f64,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub group_id: Option<Uuid>,
    pub amount: f64,
    pub description: Option<String>,
    pub expense_type: Option<String>,
    pub expense_date: Date,
    pub split_type: SplitType,
}
