use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// How an assignment turns its start/end window into concrete calendar dates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    #[default]
    Once,
    Daily,
    Weekly,
    Custom,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid schedule kind: {0}")]
pub struct ParseScheduleKindError(String);

impl FromStr for ScheduleKind {
    type Err = ParseScheduleKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "once" => Ok(ScheduleKind::Once),
            "daily" => Ok(ScheduleKind::Daily),
            "weekly" => Ok(ScheduleKind::Weekly),
            "custom" => Ok(ScheduleKind::Custom),
            _ => Err(ParseScheduleKindError(s.to_string())),
        }
    }
}

impl std::fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleKind::Once => write!(f, "once"),
            ScheduleKind::Daily => write!(f, "daily"),
            ScheduleKind::Weekly => write!(f, "weekly"),
            ScheduleKind::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Pending,
    Completed,
    Missed,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid instance status: {0}")]
pub struct ParseInstanceStatusError(String);

impl FromStr for InstanceStatus {
    type Err = ParseInstanceStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InstanceStatus::Pending),
            "completed" => Ok(InstanceStatus::Completed),
            "missed" => Ok(InstanceStatus::Missed),
            _ => Err(ParseInstanceStatusError(s.to_string())),
        }
    }
}

/// The persisted record describing who is assigned which tasks on which
/// schedule. At most one of `group_id` / `assignee_id` is set; with neither
/// set the header still exists and simply owns zero instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentHeader {
    pub id: Uuid,
    pub template_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub schedule: ScheduleKind,
    /// Weekday numbers 0=Sunday..6=Saturday; only meaningful for `Custom`.
    pub schedule_days: Vec<u8>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A reusable, ordered list of task definitions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One row of a template. `day_offset` counts days after the assignment's
/// start date; rows without one fall back to their position in the list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateTask {
    pub id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub day_offset: Option<i64>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One concrete, dated, per-person materialization of a task. The scheduled
/// date is always a real calendar date, never a range.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskInstance {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub assignee_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub status: InstanceStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A caller-supplied task for assignments created without a template. Unlike
/// template rows these may carry explicit per-task dates.
#[derive(Debug, Clone, Default)]
pub struct AdHocTask {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
}

/// Input for creating an assignment. Task source is either `template_id` or
/// the `tasks` list; target is either `group_id` or `assignee_id` (or
/// neither, which yields a header with no instances).
#[derive(Debug, Clone, Default)]
pub struct NewAssignmentData {
    pub template_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub schedule: ScheduleKind,
    pub schedule_days: Vec<u8>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub tasks: Vec<AdHocTask>,
    pub created_by: Uuid,
}

impl NewAssignmentData {
    /// Builds the header row this input describes, consuming the input.
    /// The ad hoc task list has served its purpose by the time this runs.
    pub fn into_header(self, id: Uuid) -> AssignmentHeader {
        AssignmentHeader {
            id,
            template_id: self.template_id,
            group_id: self.group_id,
            assignee_id: self.assignee_id,
            schedule: self.schedule,
            schedule_days: self.schedule_days,
            start_date: self.start_date,
            end_date: self.end_date,
            active: true,
            created_by: self.created_by,
            created_at: Utc::now(),
        }
    }
}

/// Input for adding one row to a template.
#[derive(Debug, Clone, Default)]
pub struct NewTemplateTask {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub day_offset: Option<i64>,
    pub sort_order: i64,
}

/// In-memory description of one task to materialize, after the task source
/// has been resolved. Never persisted as-is.
#[derive(Debug, Clone, Default)]
pub struct TaskSpec {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    /// Days after the assignment start date; 0 for ad hoc tasks.
    pub day_offset: u32,
}

/// The task list an assignment will materialize, plus how it was obtained.
/// `max_offset` is the largest effective day-offset, tracked for the
/// effective-end-date bookkeeping of template assignments.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTasks {
    pub specs: Vec<TaskSpec>,
    pub template_mode: bool,
    pub max_offset: u32,
}

impl ResolvedTasks {
    /// Maps fetched template rows to specs. Explicit non-negative offsets
    /// win; everything else falls back to the row's ordinal position.
    /// Template tasks never carry explicit per-task dates.
    pub fn from_template(rows: Vec<TemplateTask>) -> Self {
        let mut max_offset = 0;
        let specs = rows
            .into_iter()
            .enumerate()
            .map(|(position, row)| {
                let day_offset = match row.day_offset {
                    Some(offset) if offset >= 0 => offset as u32,
                    _ => position as u32,
                };
                max_offset = max_offset.max(day_offset);
                TaskSpec {
                    name: row.name,
                    description: row.description,
                    duration_minutes: row.duration_minutes,
                    start_date: None,
                    due_date: None,
                    scheduled_time: None,
                    day_offset,
                }
            })
            .collect();

        Self {
            specs,
            template_mode: true,
            max_offset,
        }
    }

    /// Maps caller-supplied tasks 1:1. Offsets are a template-only concept
    /// and stay at 0 here, but explicit dates are copied through.
    pub fn ad_hoc(tasks: &[AdHocTask]) -> Self {
        let specs = tasks
            .iter()
            .map(|task| TaskSpec {
                name: task.name.clone(),
                description: task.description.clone(),
                duration_minutes: task.duration_minutes,
                start_date: task.start_date,
                due_date: task.due_date,
                scheduled_time: task.scheduled_time,
                day_offset: 0,
            })
            .collect();

        Self {
            specs,
            template_mode: false,
            max_offset: 0,
        }
    }
}

/// A task instance before it is bound to an assignment id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDraft {
    pub assignee_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
}

impl InstanceDraft {
    /// Binds the draft to its owning assignment, stamping id, status and
    /// creation time. Every instance starts out pending.
    pub fn into_instance(self, assignment_id: Uuid) -> TaskInstance {
        TaskInstance {
            id: Uuid::now_v7(),
            assignment_id,
            assignee_id: self.assignee_id,
            name: self.name,
            description: self.description,
            duration_minutes: self.duration_minutes,
            scheduled_date: self.scheduled_date,
            scheduled_time: self.scheduled_time,
            status: InstanceStatus::Pending,
            completed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Successful terminal shapes of assignment creation. Failures are the
/// `Err` side of the engine result. Creating the same assignment twice is
/// not deduplicated: each call produces its own independent instance set.
#[derive(Debug)]
pub enum CreateOutcome {
    /// Header written; `instances_written` may be zero when the task source
    /// resolved to nothing.
    Created {
        header: AssignmentHeader,
        instances_written: usize,
    },
    /// Header written but the target resolved to nobody. Reported as a
    /// warning-level outcome, not an error; the header is kept.
    NoAssignees { header: AssignmentHeader },
}

impl CreateOutcome {
    pub fn header(&self) -> &AssignmentHeader {
        match self {
            CreateOutcome::Created { header, .. } => header,
            CreateOutcome::NoAssignees { header } => header,
        }
    }

    pub fn instances_written(&self) -> usize {
        match self {
            CreateOutcome::Created {
                instances_written, ..
            } => *instances_written,
            CreateOutcome::NoAssignees { .. } => 0,
        }
    }
}
