use chrono::{Datelike, Days, NaiveDate};
use uuid::Uuid;

use crate::models::{InstanceDraft, ResolvedTasks, ScheduleKind, TaskSpec};

/// Window applied to recurring assignments that have no end date.
pub const DEFAULT_LOOKAHEAD_DAYS: u64 = 30;

/// Expands a schedule into the ordered list of calendar dates it covers.
///
/// `end` is inclusive and ignored for `Once`. `Weekly` always repeats on
/// `weekday(start)` — the weekday is inherited from the start date rather
/// than supplied separately, and that simplification is intentional.
/// `schedule_days` (0=Sunday..6=Saturday) is only consulted for `Custom`.
///
/// Pure calendar arithmetic: no clock, no I/O. An inverted range yields an
/// empty list for the range-driven kinds.
pub fn expand_dates(
    kind: ScheduleKind,
    start: NaiveDate,
    end: NaiveDate,
    schedule_days: &[u8],
) -> Vec<NaiveDate> {
    match kind {
        ScheduleKind::Once => vec![start],
        ScheduleKind::Daily => date_range(start, end).collect(),
        ScheduleKind::Weekly => {
            let weekday = start.weekday();
            date_range(start, end)
                .filter(|date| date.weekday() == weekday)
                .collect()
        }
        ScheduleKind::Custom => date_range(start, end)
            .filter(|date| {
                let day = date.weekday().num_days_from_sunday() as u8;
                schedule_days.contains(&day)
            })
            .collect(),
    }
}

fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

/// Which date-basis produces the scheduled dates for an entire assignment.
///
/// Exactly one strategy applies per creation call; they are never mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSourceStrategy {
    /// Some ad hoc task carries its own due or start date; each task is
    /// dated independently as `due ?? start ?? assignment start`.
    ExplicitPerTask,
    /// Template day-offsets relative to the assignment start date. Wins
    /// unconditionally over the declared schedule. `effective_end` is
    /// bookkeeping only and feeds no further date generation.
    TemplateOffset { effective_end: NaiveDate },
    /// One-off assignment: every task lands on the start date.
    SingleDate,
    /// Calendar expansion of a daily/weekly/custom schedule.
    RecurringExpansion { dates: Vec<NaiveDate> },
}

/// Picks the date-source strategy for a resolved task set, in priority
/// order: explicit per-task dates, template offsets, single date, recurring
/// expansion. The first matching precondition decides for the whole call.
pub fn choose_date_source(
    tasks: &ResolvedTasks,
    schedule: ScheduleKind,
    schedule_days: &[u8],
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> DateSourceStrategy {
    let has_explicit_dates = tasks
        .specs
        .iter()
        .any(|spec| spec.due_date.is_some() || spec.start_date.is_some());

    if !tasks.template_mode && has_explicit_dates {
        return DateSourceStrategy::ExplicitPerTask;
    }

    if tasks.template_mode {
        return DateSourceStrategy::TemplateOffset {
            effective_end: start_date + Days::new(tasks.max_offset as u64),
        };
    }

    if schedule == ScheduleKind::Once {
        return DateSourceStrategy::SingleDate;
    }

    let until = end_date.unwrap_or(start_date + Days::new(DEFAULT_LOOKAHEAD_DAYS));
    DateSourceStrategy::RecurringExpansion {
        dates: expand_dates(schedule, start_date, until, schedule_days),
    }
}

/// Crosses assignees, tasks and dates into instance drafts.
///
/// For `ExplicitPerTask`, `TemplateOffset` and `SingleDate` each task
/// carries exactly one date, so the product is assignees × tasks; for
/// `RecurringExpansion` it is assignees × dates × tasks. Output size is
/// always `|assignees| × |tasks| × |dates-per-task|`, with no duplicates
/// and no omissions.
pub fn build_instances(
    assignees: &[Uuid],
    tasks: &ResolvedTasks,
    strategy: &DateSourceStrategy,
    start_date: NaiveDate,
) -> Vec<InstanceDraft> {
    let mut drafts = Vec::new();

    for assignee_id in assignees {
        match strategy {
            DateSourceStrategy::ExplicitPerTask => {
                for spec in &tasks.specs {
                    let date = spec.due_date.or(spec.start_date).unwrap_or(start_date);
                    drafts.push(draft(*assignee_id, spec, date));
                }
            }
            DateSourceStrategy::TemplateOffset { .. } => {
                for spec in &tasks.specs {
                    let date = start_date + Days::new(spec.day_offset as u64);
                    drafts.push(draft(*assignee_id, spec, date));
                }
            }
            DateSourceStrategy::SingleDate => {
                for spec in &tasks.specs {
                    drafts.push(draft(*assignee_id, spec, start_date));
                }
            }
            DateSourceStrategy::RecurringExpansion { dates } => {
                for date in dates {
                    for spec in &tasks.specs {
                        drafts.push(draft(*assignee_id, spec, *date));
                    }
                }
            }
        }
    }

    drafts
}

fn draft(assignee_id: Uuid, spec: &TaskSpec, scheduled_date: NaiveDate) -> InstanceDraft {
    InstanceDraft {
        assignee_id,
        name: spec.name.clone(),
        description: spec.description.clone(),
        duration_minutes: spec.duration_minutes,
        scheduled_date,
        scheduled_time: spec.scheduled_time,
    }
}
