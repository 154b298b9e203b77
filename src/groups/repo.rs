use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::groups::repo_types::{Group, NewGroup};
use crate::store::postgres::PgStore;

#[async_trait]
pub trait GroupRepo: Send + Sync {
    async fn create_group(&self, group: NewGroup) -> anyhow::Result<Group>;
    async fn get_group(&self, id: Uuid) -> anyhow::Result<Option<Group>>;
    async fn groups_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Group>>;
    /// Groups whose `members` array contains `user_id`, newest first.
    async fn groups_for_member(&self, user_id: Uuid) -> anyhow::Result<Vec<Group>>;
    async fn update_group(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Option<Group>>;
    async fn set_group_members(&self, id: Uuid, members: &[Uuid]) -> anyhow::Result<Option<Group>>;
}

const GROUP_COLUMNS: &str = "id, name, description, members, owner_id, created_at";

#[async_trait]
impl GroupRepo for PgStore {
    async fn create_group(&self, group: NewGroup) -> anyhow::Result<Group> {
        let sql = format!(
            r#"
            INSERT INTO groups (id, name, description, members, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {GROUP_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Group>(&sql)
            .bind(Uuid::new_v4())
            .bind(&group.name)
            .bind(&group.description)
            .bind(&group.members)
            .bind(group.owner_id)
            .fetch_one(self.pool())
            .await
            .context("insert group")
    }

    async fn get_group(&self, id: Uuid) -> anyhow::Result<Option<Group>> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("get group")
    }

    async fn groups_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Group>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = ANY($1)");
        sqlx::query_as::<_, Group>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .context("list groups by id")
    }

    async fn groups_for_member(&self, user_id: Uuid) -> anyhow::Result<Vec<Group>> {
        let sql = format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE members @> ARRAY[$1]::uuid[] ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Group>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .context("list groups for member")
    }

    async fn update_group(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Option<Group>> {
        let sql = format!(
            "UPDATE groups SET name = $2, description = $3 WHERE id = $1 RETURNING {GROUP_COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(self.pool())
            .await
            .context("update group")
    }

    async fn set_group_members(&self, id: Uuid, members: &[Uuid]) -> anyhow::Result<Option<Group>> {
        let sql = format!("UPDATE groups SET members = $2 WHERE id = $1 RETURNING {GROUP_COLUMNS}");
        sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .bind(members)
            .fetch_optional(self.pool())
            .await
            .context("set group members")
    }
}
