use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{AssignmentHeader, TaskInstance, TemplateTask};
use async_trait::async_trait;
use uuid::Uuid;

// Re-export domain modules
pub mod assignments;
pub mod catalog;

/// Read access to reusable task templates.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// All rows of a template, ordered by sort order. An unknown template
    /// id yields an empty list, which the engine treats as "nothing to
    /// materialize" rather than an error.
    async fn fetch_template_tasks(&self, template_id: Uuid) -> Result<Vec<TemplateTask>, CoreError>;
}

/// Read access to group membership.
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn fetch_group_members(&self, group_id: Uuid) -> Result<Vec<Uuid>, CoreError>;
}

/// The write surface the assignment engine drives: header insert, instance
/// batch insert, and the compensating header delete.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn insert_assignment(&self, header: &AssignmentHeader) -> Result<(), CoreError>;

    /// Writes the whole batch or nothing.
    async fn insert_instances(&self, instances: &[TaskInstance]) -> Result<(), CoreError>;

    /// Deletes a header; instances cascade with it.
    async fn delete_assignment(&self, id: Uuid) -> Result<(), CoreError>;

    async fn find_assignment_by_id(&self, id: Uuid)
        -> Result<Option<AssignmentHeader>, CoreError>;

    async fn find_instances_for_assignment(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<TaskInstance>, CoreError>;
}

/// Composed storage surface the engine is generic over.
pub trait Store: TemplateStore + GroupStore + AssignmentStore {}

impl<T: TemplateStore + GroupStore + AssignmentStore> Store for T {}

/// SQLite implementation of the store traits.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}
