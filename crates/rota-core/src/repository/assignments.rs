use crate::error::CoreError;
use crate::models::{AssignmentHeader, ScheduleKind, TaskInstance};
use crate::repository::SqliteStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Row shape of the assignments table. `schedule_days` is a JSON TEXT
/// column; it is NULL for non-custom schedules.
#[derive(FromRow)]
struct AssignmentRow {
    id: Uuid,
    template_id: Option<Uuid>,
    group_id: Option<Uuid>,
    assignee_id: Option<Uuid>,
    schedule: ScheduleKind,
    schedule_days: Option<String>,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    active: bool,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<AssignmentRow> for AssignmentHeader {
    type Error = CoreError;

    fn try_from(row: AssignmentRow) -> Result<Self, CoreError> {
        let schedule_days = match row.schedule_days {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        Ok(AssignmentHeader {
            id: row.id,
            template_id: row.template_id,
            group_id: row.group_id,
            assignee_id: row.assignee_id,
            schedule: row.schedule,
            schedule_days,
            start_date: row.start_date,
            end_date: row.end_date,
            active: row.active,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl super::AssignmentStore for SqliteStore {
    async fn insert_assignment(&self, header: &AssignmentHeader) -> Result<(), CoreError> {
        let schedule_days = if header.schedule_days.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&header.schedule_days)?)
        };

        sqlx::query(
            r#"INSERT INTO assignments (id, template_id, group_id, assignee_id, schedule, schedule_days, start_date, end_date, active, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(header.id)
        .bind(header.template_id)
        .bind(header.group_id)
        .bind(header.assignee_id)
        .bind(&header.schedule)
        .bind(schedule_days)
        .bind(header.start_date)
        .bind(header.end_date)
        .bind(header.active)
        .bind(header.created_by)
        .bind(header.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn insert_instances(&self, instances: &[TaskInstance]) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;

        for instance in instances {
            sqlx::query(
                r#"INSERT INTO task_instances (id, assignment_id, assignee_id, name, description, duration_minutes, scheduled_date, scheduled_time, status, completed_at, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            )
            .bind(instance.id)
            .bind(instance.assignment_id)
            .bind(instance.assignee_id)
            .bind(&instance.name)
            .bind(&instance.description)
            .bind(instance.duration_minutes)
            .bind(instance.scheduled_date)
            .bind(instance.scheduled_time)
            .bind(&instance.status)
            .bind(instance.completed_at)
            .bind(instance.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_assignment(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!(
                "Assignment with id {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn find_assignment_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AssignmentHeader>, CoreError> {
        let row: Option<AssignmentRow> = sqlx::query_as("SELECT * FROM assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.map(AssignmentHeader::try_from).transpose()
    }

    async fn find_instances_for_assignment(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<TaskInstance>, CoreError> {
        let instances = sqlx::query_as(
            r#"SELECT * FROM task_instances
            WHERE assignment_id = $1
            ORDER BY scheduled_date, name"#,
        )
        .bind(assignment_id)
        .fetch_all(self.pool())
        .await?;
        Ok(instances)
    }
}
