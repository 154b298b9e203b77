use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::store::postgres::PgStore;
use crate::users::repo_types::{ProfileUpdate, UserProfile};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<UserProfile>>;
    async fn users_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<UserProfile>>;
    /// Case-insensitive username lookup.
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserProfile>>;
    async fn update_user(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<UserProfile>>;
}

const USER_COLUMNS: &str = "id, name, email, username, phone_number, display_currency";

#[async_trait]
impl UserRepo for PgStore {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("get user")
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .context("list users by id")
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserProfile>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(username) = lower($1) LIMIT 1"
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(username)
            .fetch_optional(self.pool())
            .await
            .context("find user by username")
    }

    async fn update_user(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<UserProfile>> {
        let sql = format!(
            r#"
            UPDATE users
               SET name = $2, username = $3, phone_number = $4, display_currency = $5
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(&update.username)
            .bind(&update.phone_number)
            .bind(&update.display_currency)
            .fetch_optional(self.pool())
            .await
            .context("update user")
    }
}
