use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    payments::{
        dto::{MarkPaidRequest, MarkPaidResponse, PaymentSummary, PaymentView},
        services,
    },
    state::AppState,
};

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/payments/outstanding", get(list_outstanding))
        .route("/api/payments/past", get(list_past))
        .route("/api/payments/summary", get(get_summary))
        .route("/api/payments/:id/pay", post(mark_paid))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_outstanding(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<PaymentView>>> {
    Ok(Json(services::outstanding(state.store.as_ref(), user.id).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_past(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<PaymentView>>> {
    Ok(Json(services::past(state.store.as_ref(), user.id).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_summary(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<PaymentSummary>> {
    Ok(Json(services::summary(state.store.as_ref(), user.id).await?))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn mark_paid(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    body: Option<Json<MarkPaidRequest>>,
) -> ApiResult<Json<MarkPaidResponse>> {
    let paid_via = body.and_then(|Json(b)| b.paid_via);
    let payment =
        services::mark_paid(state.store.as_ref(), user.id, id, paid_via.as_deref()).await?;
    Ok(Json(MarkPaidResponse {
        success: true,
        payment,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{TestApp, TestUser};

    async fn dinner(app: &TestApp, payer: &TestUser, others: &[&TestUser]) -> serde_json::Value {
        let mut ids = vec![payer.id];
        ids.extend(others.iter().map(|u| u.id));
        let (status, body) = app
            .post(
                payer,
                "/expenses",
                json!({ "amount": 90.0, "description": "Dinner", "member_ids": ids }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    #[tokio::test]
    async fn debtor_pays_once_and_second_attempt_conflicts() {
        let app = TestApp::new();
        let ann = app.user("Ann Lee", "ann").await;
        let bob = app.user("Bob Ray", "bob").await;
        let created = dinner(&app, &ann, &[&bob]).await;
        let payment_id = created["payments"][0]["id"].as_str().unwrap().to_string();

        let (status, outstanding) = app.get(&bob, "/api/payments/outstanding").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outstanding.as_array().unwrap().len(), 1);
        assert_eq!(outstanding[0]["expense_name"], json!("Dinner"));
        assert_eq!(outstanding[0]["amount"], json!(45.0));

        let path = format!("/api/payments/{payment_id}/pay");
        let (status, body) = app.post(&bob, &path, json!({ "paid_via": "venmo" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["payment"]["status"], json!("paid"));
        assert_eq!(body["payment"]["paid_via"], json!("venmo"));
        assert!(body["payment"]["paid_at"].is_string());

        let (status, _) = app.post(&bob, &path, json!({})).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, outstanding) = app.get(&bob, "/api/payments/outstanding").await;
        assert!(outstanding.as_array().unwrap().is_empty());
        let (_, past) = app.get(&ann, "/api/payments/past").await;
        assert_eq!(past.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_the_debtor_can_pay() {
        let app = TestApp::new();
        let ann = app.user("Ann Lee", "ann").await;
        let bob = app.user("Bob Ray", "bob").await;
        let created = dinner(&app, &ann, &[&bob]).await;
        let payment_id = created["payments"][0]["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .post(&ann, &format!("/api/payments/{payment_id}/pay"), json!({}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .post(&bob, &format!("/api/payments/{}/pay", uuid::Uuid::new_v4()), json!({}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn summary_reports_both_directions() {
        let app = TestApp::new();
        let ann = app.user("Ann Lee", "ann").await;
        let bob = app.user("Bob Ray", "bob").await;
        let cal = app.user("Cal Ng", "cal").await;
        dinner(&app, &ann, &[&bob, &cal]).await;

        let (_, ann_summary) = app.get(&ann, "/api/payments/summary").await;
        assert_eq!(ann_summary["amount_owed_to_user"], json!(60.0));
        assert_eq!(ann_summary["amount_owed_by_user"], json!(0.0));

        let (_, bob_summary) = app.get(&bob, "/api/payments/summary").await;
        assert_eq!(bob_summary["amount_owed_by_user"], json!(30.0));
    }

    #[tokio::test]
    async fn store_failure_is_a_server_error() {
        let app = TestApp::new();
        let ann = app.user("Ann Lee", "ann").await;
        app.store.go_offline();
        let (status, body) = app.get(&ann, "/api/payments/outstanding").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], json!("Internal server error"));
    }
}
