use serde::{Deserialize, Serialize};

use crate::payments::repo_types::Payment;

/// A payment row with the description of the expense it came from.
#[derive(Debug, Serialize)]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub expense_name: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PaymentSummary {
    pub amount_owed_by_user: f64,
    pub amount_owed_to_user: f64,
}

#[derive(Debug, Deserialize)]
pub struct MarkPaidRequest {
    #[serde(default)]
    pub paid_via: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkPaidResponse {
    pub success: bool,
    pub payment: Payment,
}
