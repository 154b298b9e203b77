//! Per-user view of the expense tables.
//!
//! Everything here is a pure function of rows that were already fetched, so the
//! same derivation backs the history page, the dashboard wallet, the recent
//! list and the group balances.
//!
//! Sign convention, from the viewing user's side:
//! * `paid` entries are expenses the user created. The amount is what the
//!   other participants owe them (sum of the other participants' shares, ≥ 0).
//! * `received` entries are expenses the user only takes part in. The amount
//!   is minus their own share (≤ 0).
//!
//! All sums are done in whole cents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::expenses::repo_types::{Expense, ExpenseParticipant};

fn to_cents(x: f64) -> i64 {
    (x * 100.0).round() as i64
}

fn from_cents(c: i64) -> f64 {
    c as f64 / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Paid,
    Received,
}

impl EntryKind {
    /// Parses the `type` query parameter. Anything else means "no filter".
    pub fn from_query(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" => Some(EntryKind::Paid),
            "received" => Some(EntryKind::Received),
            _ => None,
        }
    }
}

/// One expense as seen by one user.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    #[serde(with = "crate::dates::iso_date")]
    pub date: Date,
    #[serde(skip)]
    pub created_at: OffsetDateTime,
    pub amount: f64,
    pub group: String,
    pub description: String,
    pub creator_name: String,
    /// Creator of a received entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Other participants of a paid entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl HistoryEntry {
    fn counterpart(&self) -> &str {
        self.from.as_deref().or(self.to.as_deref()).unwrap_or_default()
    }

    fn cents(&self) -> i64 {
        to_cents(self.amount)
    }
}

/// Rows needed to derive one user's history.
#[derive(Debug, Default)]
pub struct Ledger {
    pub user_id: Uuid,
    /// Expenses created by the user.
    pub created: Vec<Expense>,
    /// Expenses the user participates in; may overlap with `created`.
    pub joined: Vec<Expense>,
    /// Participant rows for every expense in `created` and `joined`.
    pub participants: Vec<ExpenseParticipant>,
    pub group_names: HashMap<Uuid, String>,
    pub user_names: HashMap<Uuid, String>,
}

impl Ledger {
    fn name_of(&self, id: Uuid) -> String {
        self.user_names.get(&id).cloned().unwrap_or_default()
    }

    fn group_of(&self, e: &Expense) -> String {
        e.group_id
            .and_then(|g| self.group_names.get(&g).cloned())
            .unwrap_or_default()
    }

    fn rows_for(&self, expense_id: Uuid) -> impl Iterator<Item = &ExpenseParticipant> {
        self.participants
            .iter()
            .filter(move |p| p.expense_id == expense_id)
    }

    fn base_entry(&self, e: &Expense, kind: EntryKind, cents: i64) -> HistoryEntry {
        HistoryEntry {
            id: e.id,
            kind,
            date: e.expense_date,
            created_at: e.created_at,
            amount: from_cents(cents),
            group: self.group_of(e),
            description: e.description.clone().unwrap_or_default(),
            creator_name: self.name_of(e.user_id),
            from: None,
            to: None,
        }
    }

    /// Paid entries followed by received entries, in store order.
    ///
    /// A paid amount leaves out the creator's own share: it is only what the
    /// other participants owe. A 50/50 split of 50 therefore shows 25 for the
    /// creator, not 50, and each paid entry equals the negated sum of the
    /// matching received entries. Summing every share, creator included,
    /// would count money the creator owes themselves as owed to them.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let mut out = Vec::with_capacity(self.created.len() + self.joined.len());

        for e in &self.created {
            let others: Vec<&ExpenseParticipant> = self
                .rows_for(e.id)
                .filter(|p| p.member_id != self.user_id)
                .collect();
            let cents = others.iter().map(|p| to_cents(p.share)).sum();
            let names: Vec<String> = others
                .iter()
                .map(|p| self.name_of(p.member_id))
                .filter(|n| !n.is_empty())
                .collect();
            let mut entry = self.base_entry(e, EntryKind::Paid, cents);
            entry.to = Some(names.join(", "));
            out.push(entry);
        }

        for e in &self.joined {
            if e.user_id == self.user_id {
                continue;
            }
            let mine: i64 = self
                .rows_for(e.id)
                .filter(|p| p.member_id == self.user_id)
                .map(|p| to_cents(p.share))
                .sum();
            let mut entry = self.base_entry(e, EntryKind::Received, -mine);
            entry.from = Some(entry.creator_name.clone());
            out.push(entry);
        }
        out
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct HistoryFilter {
    pub group: Option<String>,
    pub person: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Applies the history page filters. Blank filters are ignored.
pub fn apply_filter(entries: Vec<HistoryEntry>, filter: &HistoryFilter) -> Vec<HistoryEntry> {
    let group = filter.group.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let person = filter.person.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let kind = filter.kind.as_deref().and_then(EntryKind::from_query);

    entries
        .into_iter()
        .filter(|e| group.map_or(true, |g| contains_ci(&e.group, g)))
        .filter(|e| person.map_or(true, |p| contains_ci(e.counterpart(), p)))
        .filter(|e| kind.map_or(true, |k| e.kind == k))
        .collect()
}

/// Non-zero entries, newest first (ties broken by creation time), at most `limit`.
pub fn recent(entries: &[HistoryEntry], limit: usize) -> Vec<HistoryEntry> {
    let mut rows: Vec<HistoryEntry> = entries.iter().filter(|e| e.cents() != 0).cloned().collect();
    rows.sort_by(|a, b| (b.date, b.created_at).cmp(&(a.date, a.created_at)));
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceClass {
    Positive,
    Negative,
    Zero,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wallet {
    pub owed: f64,
    pub owing: f64,
    pub net: f64,
    pub balance_class: BalanceClass,
}

pub fn wallet(entries: &[HistoryEntry]) -> Wallet {
    let owed: i64 = entries.iter().map(|e| e.cents()).filter(|c| *c > 0).sum();
    let owing: i64 = entries.iter().map(|e| e.cents()).filter(|c| *c < 0).map(i64::abs).sum();
    let net = owed - owing;
    let balance_class = match net {
        n if n > 0 => BalanceClass::Positive,
        n if n < 0 => BalanceClass::Negative,
        _ => BalanceClass::Zero,
    };
    Wallet {
        owed: from_cents(owed),
        owing: from_cents(owing),
        net: from_cents(net),
        balance_class,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberBalance {
    pub member_id: Uuid,
    pub member: String,
    pub balance_cents: i64,
    pub balance: f64,
}

/// Signed net per member across one group's expenses: the creator gains the
/// other participants' shares, each participant loses their own.
///
/// `members` are always listed, even at zero; anyone else who shows up in the
/// expenses (a member who since left) is listed too.
pub fn group_balances(
    expenses: &[Expense],
    participants: &[ExpenseParticipant],
    members: &[Uuid],
    names: &HashMap<Uuid, String>,
) -> Vec<MemberBalance> {
    let mut net: HashMap<Uuid, i64> = members.iter().map(|m| (*m, 0)).collect();
    let creators: HashMap<Uuid, Uuid> = expenses.iter().map(|e| (e.id, e.user_id)).collect();

    for p in participants {
        let Some(&creator) = creators.get(&p.expense_id) else {
            continue;
        };
        if p.member_id == creator {
            continue;
        }
        let cents = to_cents(p.share);
        *net.entry(creator).or_default() += cents;
        *net.entry(p.member_id).or_default() -= cents;
    }

    let mut rows: Vec<MemberBalance> = net
        .into_iter()
        .map(|(member_id, cents)| MemberBalance {
            member_id,
            member: names.get(&member_id).cloned().unwrap_or_default(),
            balance_cents: cents,
            balance: from_cents(cents),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.member
            .to_lowercase()
            .cmp(&b.member.to_lowercase())
            .then(a.member_id.cmp(&b.member_id))
    });
    rows
}
