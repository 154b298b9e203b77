use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{
    expenses::repo_types::{Expense, ExpenseParticipant},
    payments::repo_types::Payment,
};

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "crate::dates::iso_date::option")]
    pub expense_date: Option<Date>,
    #[serde(default)]
    pub expense_type: Option<String>,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
    #[serde(default)]
    pub split_type: Option<String>,
    #[serde(default)]
    pub custom_amounts: Option<Vec<f64>>,
    #[serde(default)]
    pub custom_percentages: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct CreatedExpense {
    pub expense: Expense,
    pub participants: Vec<ExpenseParticipant>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseDetails {
    #[serde(flatten)]
    pub expense: Expense,
    pub participants: Vec<ExpenseParticipant>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: usize,
}

fn default_recent_limit() -> usize {
    5
}
