use crate::error::CoreError;
use crate::models::{Group, NewTemplateTask, TaskTemplate, TemplateTask};
use crate::repository::SqliteStore;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::TemplateStore for SqliteStore {
    async fn fetch_template_tasks(
        &self,
        template_id: Uuid,
    ) -> Result<Vec<TemplateTask>, CoreError> {
        let rows = sqlx::query_as(
            "SELECT * FROM template_tasks WHERE template_id = $1 ORDER BY sort_order",
        )
        .bind(template_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl super::GroupStore for SqliteStore {
    async fn fetch_group_members(&self, group_id: Uuid) -> Result<Vec<Uuid>, CoreError> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT member_id FROM group_members WHERE group_id = $1 ORDER BY member_id")
                .bind(group_id)
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|(member_id,)| member_id).collect())
    }
}

impl SqliteStore {
    pub async fn create_template(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<TaskTemplate, CoreError> {
        let template = sqlx::query_as(
            r#"INSERT INTO task_templates (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, created_at"#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        Ok(template)
    }

    pub async fn add_template_task(
        &self,
        template_id: Uuid,
        data: NewTemplateTask,
    ) -> Result<TemplateTask, CoreError> {
        let row = sqlx::query_as(
            r#"INSERT INTO template_tasks (id, template_id, name, description, duration_minutes, day_offset, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, template_id, name, description, duration_minutes, day_offset, sort_order"#,
        )
        .bind(Uuid::now_v7())
        .bind(template_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.duration_minutes)
        .bind(data.day_offset)
        .bind(data.sort_order)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn create_group(&self, name: String) -> Result<Group, CoreError> {
        let group = sqlx::query_as(
            r#"INSERT INTO member_groups (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at"#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        Ok(group)
    }

    pub async fn add_group_member(&self, group_id: Uuid, member_id: Uuid) -> Result<(), CoreError> {
        sqlx::query("INSERT INTO group_members (group_id, member_id) VALUES ($1, $2)")
            .bind(group_id)
            .bind(member_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
