use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::friends::repo_types::FriendLink;
use crate::store::postgres::PgStore;

#[async_trait]
pub trait FriendRepo: Send + Sync {
    async fn friend_links(&self, owner_id: Uuid) -> anyhow::Result<Vec<FriendLink>>;
    async fn get_friend_link(&self, id: Uuid) -> anyhow::Result<Option<FriendLink>>;
    async fn find_friend_link(
        &self,
        owner_id: Uuid,
        friend_id: Uuid,
    ) -> anyhow::Result<Option<FriendLink>>;
    async fn insert_friend_link(
        &self,
        owner_id: Uuid,
        friend_id: Uuid,
        note: Option<&str>,
    ) -> anyhow::Result<FriendLink>;
    /// Deletes the link if it belongs to `owner_id`; returns whether a row went away.
    async fn delete_friend_link(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

const LINK_COLUMNS: &str = "id, owner_id, friend_id, note, created_at";

#[async_trait]
impl FriendRepo for PgStore {
    async fn friend_links(&self, owner_id: Uuid) -> anyhow::Result<Vec<FriendLink>> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM friend_links WHERE owner_id = $1");
        sqlx::query_as::<_, FriendLink>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool())
            .await
            .context("list friend links")
    }

    async fn get_friend_link(&self, id: Uuid) -> anyhow::Result<Option<FriendLink>> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM friend_links WHERE id = $1");
        sqlx::query_as::<_, FriendLink>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("get friend link")
    }

    async fn find_friend_link(
        &self,
        owner_id: Uuid,
        friend_id: Uuid,
    ) -> anyhow::Result<Option<FriendLink>> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM friend_links WHERE owner_id = $1 AND friend_id = $2 LIMIT 1"
        );
        sqlx::query_as::<_, FriendLink>(&sql)
            .bind(owner_id)
            .bind(friend_id)
            .fetch_optional(self.pool())
            .await
            .context("find friend link")
    }

    async fn insert_friend_link(
        &self,
        owner_id: Uuid,
        friend_id: Uuid,
        note: Option<&str>,
    ) -> anyhow::Result<FriendLink> {
        let sql = format!(
            r#"
            INSERT INTO friend_links (id, owner_id, friend_id, note)
            VALUES ($1, $2, $3, $4)
            RETURNING {LINK_COLUMNS}
            "#
        );
        sqlx::query_as::<_, FriendLink>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(friend_id)
            .bind(note)
            .fetch_one(self.pool())
            .await
            .context("insert friend link")
    }

    async fn delete_friend_link(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM friend_links WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool())
            .await
            .context("delete friend link")?;
        Ok(res.rows_affected() > 0)
    }
}
