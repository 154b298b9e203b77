use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::expenses::repo_types::{Expense, ExpenseParticipant, NewExpense};
use crate::store::postgres::PgStore;

#[async_trait]
pub trait ExpenseRepo: Send + Sync {
    async fn insert_expense(&self, expense: NewExpense) -> anyhow::Result<Expense>;
    async fn insert_participants(
        &self,
        rows: &[ExpenseParticipant],
    ) -> anyhow::Result<Vec<ExpenseParticipant>>;
    async fn get_expense(&self, id: Uuid) -> anyhow::Result<Option<Expense>>;
    /// Expenses created by `user_id`, newest first.
    async fn expenses_by_creator(&self, user_id: Uuid) -> anyhow::Result<Vec<Expense>>;
    async fn expenses_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Expense>>;
    async fn expenses_by_group(&self, group_id: Uuid) -> anyhow::Result<Vec<Expense>>;
    async fn participants_for_member(&self, member_id: Uuid)
        -> anyhow::Result<Vec<ExpenseParticipant>>;
    async fn participants_for_expenses(
        &self,
        expense_ids: &[Uuid],
    ) -> anyhow::Result<Vec<ExpenseParticipant>>;
}

const EXPENSE_COLUMNS: &str =
    "id, user_id, group_id, amount, description, expense_type, expense_date, split_type, created_at";

#[async_trait]
impl ExpenseRepo for PgStore {
    async fn insert_expense(&self, expense: NewExpense) -> anyhow::Result<Expense> {
        let sql = format!(
            r#"
            INSERT INTO expenses
                (id, user_id, group_id, amount, description, expense_type, expense_date, split_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EXPENSE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(Uuid::new_v4())
            .bind(expense.user_id)
            .bind(expense.group_id)
            .bind(expense.amount)
            .bind(&expense.description)
            .bind(&expense.expense_type)
            .bind(expense.expense_date)
            .bind(expense.split_type)
            .fetch_one(self.pool())
            .await
            .context("insert expense")
    }

    async fn insert_participants(
        &self,
        rows: &[ExpenseParticipant],
    ) -> anyhow::Result<Vec<ExpenseParticipant>> {
        let mut tx = self.pool().begin().await.context("begin tx")?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let inserted = sqlx::query_as::<_, ExpenseParticipant>(
                r#"
                INSERT INTO expense_participants (expense_id, member_id, share)
                VALUES ($1, $2, $3)
                RETURNING expense_id, member_id, share
                "#,
            )
            .bind(row.expense_id)
            .bind(row.member_id)
            .bind(row.share)
            .fetch_one(&mut *tx)
            .await
            .context("insert expense participant")?;
            out.push(inserted);
        }
        tx.commit().await.context("commit tx")?;
        Ok(out)
    }

    async fn get_expense(&self, id: Uuid) -> anyhow::Result<Option<Expense>> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1");
        sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("get expense")
    }

    async fn expenses_by_creator(&self, user_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = $1 ORDER BY expense_date DESC, created_at DESC"
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .context("list expenses by creator")
    }

    async fn expenses_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Expense>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ANY($1)");
        sqlx::query_as::<_, Expense>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .context("list expenses by id")
    }

    async fn expenses_by_group(&self, group_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE group_id = $1");
        sqlx::query_as::<_, Expense>(&sql)
            .bind(group_id)
            .fetch_all(self.pool())
            .await
            .context("list expenses by group")
    }

    async fn participants_for_member(
        &self,
        member_id: Uuid,
    ) -> anyhow::Result<Vec<ExpenseParticipant>> {
        sqlx::query_as::<_, ExpenseParticipant>(
            "SELECT expense_id, member_id, share FROM expense_participants WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_all(self.pool())
        .await
        .context("list participant rows for member")
    }

    async fn participants_for_expenses(
        &self,
        expense_ids: &[Uuid],
    ) -> anyhow::Result<Vec<ExpenseParticipant>> {
        if expense_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, ExpenseParticipant>(
            "SELECT expense_id, member_id, share FROM expense_participants WHERE expense_id = ANY($1)",
        )
        .bind(expense_ids)
        .fetch_all(self.pool())
        .await
        .context("list participant rows for expenses")
    }
}
