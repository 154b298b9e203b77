use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::payments::repo_types::{NewPayment, Payment};
use crate::store::postgres::PgStore;

#[async_trait]
pub trait PaymentRepo: Send + Sync {
    async fn insert_payments(&self, rows: &[NewPayment]) -> anyhow::Result<Vec<Payment>>;
    async fn get_payment(&self, id: Uuid) -> anyhow::Result<Option<Payment>>;
    /// Payments where the user is on either side, newest first.
    async fn payments_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Payment>>;
    /// Flips a `requested` payment to `paid`. Returns `None` when the row is
    /// missing or no longer `requested`.
    async fn mark_payment_paid(
        &self,
        id: Uuid,
        paid_at: OffsetDateTime,
        paid_via: Option<&str>,
    ) -> anyhow::Result<Option<Payment>>;
}

const PAYMENT_COLUMNS: &str = "id, expense_id, group_id, from_user_id, to_user_id, amount, \
     status, created_at, paid_at, paid_via";

#[async_trait]
impl PaymentRepo for PgStore {
    async fn insert_payments(&self, rows: &[NewPayment]) -> anyhow::Result<Vec<Payment>> {
        let sql = format!(
            r#"
            INSERT INTO payments (id, expense_id, group_id, from_user_id, to_user_id, amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'requested')
            RETURNING {PAYMENT_COLUMNS}
            "#
        );
        let mut tx = self.pool().begin().await.context("begin tx")?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let payment = sqlx::query_as::<_, Payment>(&sql)
                .bind(Uuid::new_v4())
                .bind(row.expense_id)
                .bind(row.group_id)
                .bind(row.from_user_id)
                .bind(row.to_user_id)
                .bind(row.amount)
                .fetch_one(&mut *tx)
                .await
                .context("insert payment")?;
            out.push(payment);
        }
        tx.commit().await.context("commit tx")?;
        Ok(out)
    }

    async fn get_payment(&self, id: Uuid) -> anyhow::Result<Option<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("get payment")
    }

    async fn payments_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Payment>> {
        let sql = format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
              FROM payments
             WHERE from_user_id = $1 OR to_user_id = $1
             ORDER BY created_at DESC
            "#
        );
        sqlx::query_as::<_, Payment>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .context("list payments for user")
    }

    async fn mark_payment_paid(
        &self,
        id: Uuid,
        paid_at: OffsetDateTime,
        paid_via: Option<&str>,
    ) -> anyhow::Result<Option<Payment>> {
        let sql = format!(
            r#"
            UPDATE payments
               SET status = 'paid', paid_at = $2, paid_via = $3
             WHERE id = $1 AND status = 'requested'
            RETURNING {PAYMENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Payment>(&sql)
            .bind(id)
            .bind(paid_at)
            .bind(paid_via)
            .fetch_optional(self.pool())
            .await
            .context("mark payment paid")
    }
}
