use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    inbox::{
        repo::InboxRepo,
        repo_types::{Message, Notification, NotificationStatus},
    },
    store::Store,
};

#[derive(Debug, Deserialize)]
pub struct NotificationAction {
    pub notification_id: Uuid,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct ThreadSummary {
    pub thread_id: Uuid,
    pub name: String,
    pub last_message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn parse_action(raw: &str) -> ApiResult<NotificationStatus> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "accept" => Ok(NotificationStatus::Accepted),
        "decline" => Ok(NotificationStatus::Declined),
        other => Err(ApiError::bad_request(format!("Unsupported action: {other}"))),
    }
}

#[instrument(skip(store, req))]
pub async fn act_on(
    store: &dyn Store,
    user_id: Uuid,
    req: &NotificationAction,
) -> ApiResult<Notification> {
    let status = parse_action(&req.action)?;
    let updated = store
        .set_notification_status(user_id, req.notification_id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    info!(notification_id = %updated.id, status = ?updated.status, "notification handled");
    Ok(updated)
}

/// Most recent message of every thread, newest thread first.
pub fn latest_per_thread(messages: Vec<Message>) -> Vec<ThreadSummary> {
    let mut out: Vec<ThreadSummary> = Vec::new();
    for m in messages {
        if out.iter().any(|t| t.thread_id == m.thread_id) {
            continue;
        }
        out.push(ThreadSummary {
            thread_id: m.thread_id,
            name: m.sender_name,
            last_message: m.body,
            created_at: m.created_at,
        });
    }
    out
}
