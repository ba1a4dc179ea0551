use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{CreateOutcome, NewAssignmentData, ResolvedTasks, TaskInstance};
use crate::recurrence::{build_instances, choose_date_source};
use crate::repository::Store;

/// Turns an assignment definition into a persisted header plus its
/// materialized task instances.
///
/// The engine performs two writes: the header, then the instance batch. If
/// the batch fails, the header is deleted again (compensating rollback) so
/// the operation reads as if it never happened. There is no dedup across
/// calls and no protection against concurrent callers; both are deferred to
/// the storage layer or the caller.
pub struct AssignmentEngine<S> {
    store: S,
}

impl<S: Store> AssignmentEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an assignment and fans it out into dated task instances.
    ///
    /// Terminal shapes: `Ok(Created)` (header plus zero or more instances),
    /// `Ok(NoAssignees)` (header kept, nobody to assign to), or `Err` (a
    /// lookup or write failed; nothing survives the call).
    pub async fn create_assignment(
        &self,
        data: NewAssignmentData,
    ) -> Result<CreateOutcome, CoreError> {
        let assignment_id = Uuid::now_v7();
        let span = info_span!("create_assignment", assignment_id = %assignment_id);
        self.create_assignment_inner(assignment_id, data)
            .instrument(span)
            .await
    }

    async fn create_assignment_inner(
        &self,
        assignment_id: Uuid,
        data: NewAssignmentData,
    ) -> Result<CreateOutcome, CoreError> {
        validate(&data)?;

        // The target and the task source are independent lookups; overlap
        // them. A failure here surfaces before anything is persisted, so
        // there is nothing to roll back.
        let (assignees, tasks) = tokio::try_join!(
            self.resolve_assignees(&data),
            self.resolve_task_source(&data),
        )?;

        let header = data.into_header(assignment_id);
        self.store.insert_assignment(&header).await?;

        if assignees.is_empty() {
            warn!("no assignees found; assignment kept without instances");
            return Ok(CreateOutcome::NoAssignees { header });
        }

        let strategy = choose_date_source(
            &tasks,
            header.schedule,
            &header.schedule_days,
            header.start_date,
            header.end_date,
        );
        let drafts = build_instances(&assignees, &tasks, &strategy, header.start_date);
        if drafts.is_empty() {
            info!("task source resolved to nothing; skipping instance write");
            return Ok(CreateOutcome::Created {
                header,
                instances_written: 0,
            });
        }

        let instances: Vec<TaskInstance> = drafts
            .into_iter()
            .map(|draft| draft.into_instance(assignment_id))
            .collect();

        match self.store.insert_instances(&instances).await {
            Ok(()) => {
                info!(
                    assignees = assignees.len(),
                    instances = instances.len(),
                    "assignment committed"
                );
                Ok(CreateOutcome::Created {
                    header,
                    instances_written: instances.len(),
                })
            }
            Err(write_error) => {
                warn!("instance write failed; rolling back assignment header");
                // Best effort: the operation is already a failure either way.
                if let Err(rollback_error) = self.store.delete_assignment(assignment_id).await {
                    error!(error = %rollback_error, "compensating header delete failed");
                }
                Err(write_error)
            }
        }
    }

    /// Resolves the assignment target into concrete assignee ids. A group
    /// fans out to its members and shadows any explicit assignee; an empty
    /// result is a reportable outcome, not an error.
    async fn resolve_assignees(&self, data: &NewAssignmentData) -> Result<Vec<Uuid>, CoreError> {
        if let Some(group_id) = data.group_id {
            self.store.fetch_group_members(group_id).await
        } else if let Some(assignee_id) = data.assignee_id {
            Ok(vec![assignee_id])
        } else {
            Ok(Vec::new())
        }
    }

    /// Resolves the task source: template rows when a template id is given,
    /// the caller's ad hoc list otherwise.
    async fn resolve_task_source(
        &self,
        data: &NewAssignmentData,
    ) -> Result<ResolvedTasks, CoreError> {
        match data.template_id {
            Some(template_id) => {
                let rows = self.store.fetch_template_tasks(template_id).await?;
                Ok(ResolvedTasks::from_template(rows))
            }
            None => Ok(ResolvedTasks::ad_hoc(&data.tasks)),
        }
    }
}

fn validate(data: &NewAssignmentData) -> Result<(), CoreError> {
    if let Some(day) = data.schedule_days.iter().find(|day| **day > 6) {
        return Err(CoreError::InvalidInput(format!(
            "weekday {day} is out of range (expected 0-6)"
        )));
    }
    Ok(())
}
