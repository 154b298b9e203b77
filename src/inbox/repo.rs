use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::inbox::repo_types::{Message, NewNotification, Notification, NotificationStatus};
use crate::store::postgres::PgStore;

#[async_trait]
pub trait InboxRepo: Send + Sync {
    async fn insert_notifications(&self, rows: &[NewNotification]) -> anyhow::Result<()>;
    /// Pending notifications addressed to `user_id`, newest first.
    async fn pending_notifications(&self, user_id: Uuid) -> anyhow::Result<Vec<Notification>>;
    async fn set_notification_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: NotificationStatus,
    ) -> anyhow::Result<Option<Notification>>;
    /// Messages addressed to `user_id`, newest first.
    async fn messages_for(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>>;
}

const NOTIFICATION_COLUMNS: &str = "id, user_id, from_user_id, kind, message, status, created_at";

#[async_trait]
impl InboxRepo for PgStore {
    async fn insert_notifications(&self, rows: &[NewNotification]) -> anyhow::Result<()> {
        let mut tx = self.pool().begin().await.context("begin tx")?;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO notifications (id, user_id, from_user_id, kind, message, status)
                VALUES ($1, $2, $3, $4, $5, 'pending')
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(row.user_id)
            .bind(row.from_user_id)
            .bind(row.kind)
            .bind(&row.message)
            .execute(&mut *tx)
            .await
            .context("insert notification")?;
        }
        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn pending_notifications(&self, user_id: Uuid) -> anyhow::Result<Vec<Notification>> {
        let sql = format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
              FROM notifications
             WHERE user_id = $1 AND status = 'pending'
             ORDER BY created_at DESC
            "#
        );
        sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .context("list pending notifications")
    }

    async fn set_notification_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: NotificationStatus,
    ) -> anyhow::Result<Option<Notification>> {
        let sql = format!(
            r#"
            UPDATE notifications SET status = $3
             WHERE id = $1 AND user_id = $2
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(status)
            .fetch_optional(self.pool())
            .await
            .context("update notification status")
    }

    async fn messages_for(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, thread_id, recipient_id, sender_name, body, created_at
              FROM messages
             WHERE recipient_id = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .context("list messages")
    }
}
