//! Expense split allocation.
//!
//! All arithmetic happens in whole cents so that the generated shares always
//! add back up to the expense total. The last participant absorbs whatever
//! rounding left over.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance used when checking that custom amounts add up to the total and
/// that custom percentages add up to 100.
pub const EPSILON: f64 = 0.01;

/// Largest accepted expense total. Keeps every cent count, and any sum of
/// them, well inside `i64`.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum SplitType {
    Equal,
    Amount,
    Percentage,
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SplitType::Equal => "equal",
            SplitType::Amount => "amount",
            SplitType::Percentage => "percentage",
        };
        f.write_str(s)
    }
}

impl FromStr for SplitType {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "equal" => Ok(SplitType::Equal),
            "amount" => Ok(SplitType::Amount),
            "percentage" => Ok(SplitType::Percentage),
            other => Err(SplitError::UnsupportedMode(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("Amount must be > 0.")]
    NonPositiveTotal,

    #[error("Amount cannot have more than two decimal places.")]
    SubCentTotal,

    #[error("Amount cannot exceed {}.", MAX_AMOUNT)]
    TotalTooLarge,

    #[error("Select at least one member.")]
    NoParticipants,

    #[error("Unsupported split type: {0}")]
    UnsupportedMode(String),

    #[error("{0} split requires one value per member")]
    MissingValues(SplitType),

    #[error("Expected {expected} split values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Split values cannot be negative.")]
    NegativeValue,

    #[error("Custom amounts add up to {got:.2}, expected {expected:.2}")]
    AmountMismatch { expected: f64, got: f64 },

    #[error("Custom percentages must add up to 100% (got {got:.2}%)")]
    PercentageMismatch { got: f64 },
}

/// How an expense total is divided.
#[derive(Debug, Clone, Copy)]
pub enum SplitRule<'a> {
    Equal,
    Amount(&'a [f64]),
    Percentage(&'a [f64]),
}

impl<'a> SplitRule<'a> {
    /// Pairs a split type with the custom values sent alongside it.
    pub fn new(
        split_type: SplitType,
        amounts: Option<&'a [f64]>,
        percentages: Option<&'a [f64]>,
    ) -> Result<Self, SplitError> {
        match split_type {
            SplitType::Equal => Ok(SplitRule::Equal),
            SplitType::Amount => amounts
                .map(SplitRule::Amount)
                .ok_or(SplitError::MissingValues(SplitType::Amount)),
            SplitType::Percentage => percentages
                .map(SplitRule::Percentage)
                .ok_or(SplitError::MissingValues(SplitType::Percentage)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share<T> {
    pub member: T,
    pub amount: f64,
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn to_cents(x: f64) -> i64 {
    (x * 100.0).round() as i64
}

fn from_cents(c: i64) -> f64 {
    c as f64 / 100.0
}

/// Splits `total` across `participants` according to `rule`.
pub fn allocate<T: Clone>(
    total: f64,
    participants: &[T],
    rule: SplitRule<'_>,
) -> Result<Vec<Share<T>>, SplitError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(SplitError::NonPositiveTotal);
    }
    if total > MAX_AMOUNT {
        return Err(SplitError::TotalTooLarge);
    }
    if ((total * 100.0) - (total * 100.0).round()).abs() > 1e-6 {
        return Err(SplitError::SubCentTotal);
    }
    if participants.is_empty() {
        return Err(SplitError::NoParticipants);
    }

    let total_cents = to_cents(total);
    let cents = match rule {
        SplitRule::Equal => equal_cents(total_cents, participants.len()),
        SplitRule::Amount(amounts) => amount_cents(total, total_cents, participants.len(), amounts)?,
        SplitRule::Percentage(pcts) => percentage_cents(total_cents, participants.len(), pcts)?,
    };

    Ok(participants
        .iter()
        .cloned()
        .zip(cents)
        .map(|(member, c)| Share {
            member,
            amount: from_cents(c),
        })
        .collect())
}

fn equal_cents(total_cents: i64, n: usize) -> Vec<i64> {
    let n_i = n as i64;
    let mut base = (total_cents as f64 / n as f64).round() as i64;
    // Rounding up on tiny totals could push the last share below zero.
    if base * (n_i - 1) > total_cents {
        base = total_cents / n_i;
    }
    let mut out = vec![base; n - 1];
    out.push(total_cents - base * (n_i - 1));
    out
}

fn check_values(n: usize, values: &[f64]) -> Result<(), SplitError> {
    if values.len() != n {
        return Err(SplitError::LengthMismatch {
            expected: n,
            got: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(SplitError::NegativeValue);
    }
    Ok(())
}

fn absorb_last(total_cents: i64, mut head: Vec<i64>) -> Option<Vec<i64>> {
    let assigned = head.iter().try_fold(0i64, |acc, c| acc.checked_add(*c))?;
    let last = total_cents.checked_sub(assigned)?;
    if last < 0 {
        return None;
    }
    head.push(last);
    Some(head)
}

fn amount_cents(
    total: f64,
    total_cents: i64,
    n: usize,
    amounts: &[f64],
) -> Result<Vec<i64>, SplitError> {
    check_values(n, amounts)?;
    let sum: f64 = amounts.iter().sum();
    let mismatch = SplitError::AmountMismatch {
        expected: total,
        got: sum,
    };
    if (sum - total).abs() > EPSILON + 1e-9 {
        return Err(mismatch);
    }
    let head = amounts[..n - 1].iter().map(|a| to_cents(*a)).collect();
    absorb_last(total_cents, head).ok_or(mismatch)
}

fn percentage_cents(total_cents: i64, n: usize, pcts: &[f64]) -> Result<Vec<i64>, SplitError> {
    check_values(n, pcts)?;
    let sum: f64 = pcts.iter().sum();
    let mismatch = SplitError::PercentageMismatch { got: sum };
    if (sum - 100.0).abs() > EPSILON + 1e-9 {
        return Err(mismatch);
    }
    let head = pcts[..n - 1]
        .iter()
        .map(|p| (total_cents as f64 * p / 100.0).round() as i64)
        .collect();
    absorb_last(total_cents, head).ok_or(mismatch)
}
