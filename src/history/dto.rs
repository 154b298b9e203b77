use serde::Serialize;
use uuid::Uuid;

use crate::history::ledger::{BalanceClass, HistoryEntry, MemberBalance};

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub received: Vec<HistoryEntry>,
    pub paid: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct GroupNames {
    pub groups: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletTotals {
    pub owed: f64,
    pub owing: f64,
}

#[derive(Debug, Serialize)]
pub struct GroupRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RecentTransaction {
    pub name: String,
    pub amount: f64,
    pub sign: &'static str,
    pub date: String,
    pub group_name: String,
}

impl From<&HistoryEntry> for RecentTransaction {
    fn from(e: &HistoryEntry) -> Self {
        Self {
            name: if e.description.is_empty() {
                "Expense".into()
            } else {
                e.description.clone()
            },
            amount: e.amount.abs(),
            sign: if e.amount > 0.0 { "+" } else { "-" },
            date: crate::dates::format_date(e.date),
            group_name: e.group.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user_name: String,
    pub wallet: WalletTotals,
    pub wallet_balance: f64,
    pub balance_class: BalanceClass,
    pub groups: Vec<GroupRef>,
    pub recent_transactions: Vec<RecentTransaction>,
}

#[derive(Debug, Serialize)]
pub struct GroupBalances {
    pub group_id: Uuid,
    pub group_name: String,
    pub balances: Vec<MemberBalance>,
}
