use chrono::{Datelike, NaiveDate};
use rota_core::db::establish_connection;
use rota_core::engine::AssignmentEngine;
use rota_core::models::*;
use rota_core::repository::{AssignmentStore, SqliteStore};
use tempfile::TempDir;
use uuid::Uuid;

/// Helper function to create a test database and engine
async fn setup_test_engine() -> (AssignmentEngine<SqliteStore>, TempDir) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    (AssignmentEngine::new(SqliteStore::new(pool)), temp_dir)
}

/// Helper function to create a group with the given number of members
async fn create_test_group(store: &SqliteStore, member_count: usize) -> (Uuid, Vec<Uuid>) {
    let group = store
        .create_group("Test Group".to_string())
        .await
        .expect("Failed to create test group");

    let mut members = Vec::new();
    for _ in 0..member_count {
        let member_id = Uuid::now_v7();
        store
            .add_group_member(group.id, member_id)
            .await
            .expect("Failed to add group member");
        members.push(member_id);
    }

    (group.id, members)
}

/// Helper function to create a template with the given explicit day offsets
async fn create_test_template(store: &SqliteStore, offsets: &[Option<i64>]) -> Uuid {
    let template = store
        .create_template("Test Template".to_string(), None)
        .await
        .expect("Failed to create test template");

    for (i, offset) in offsets.iter().enumerate() {
        store
            .add_template_task(
                template.id,
                NewTemplateTask {
                    name: format!("Step {}", i + 1),
                    day_offset: *offset,
                    sort_order: i as i64,
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to add template task");
    }

    template.id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_ad_hoc_once_assignment() {
    let (engine, _temp_dir) = setup_test_engine().await;
    let assignee = Uuid::now_v7();

    let outcome = engine
        .create_assignment(NewAssignmentData {
            assignee_id: Some(assignee),
            schedule: ScheduleKind::Once,
            start_date: date(2026, 1, 25),
            tasks: vec![
                AdHocTask {
                    name: "Do the dishes".to_string(),
                    duration_minutes: Some(15),
                    ..Default::default()
                },
                AdHocTask {
                    name: "Take out trash".to_string(),
                    ..Default::default()
                },
            ],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    assert_eq!(outcome.instances_written(), 2);

    let instances = engine
        .store()
        .find_instances_for_assignment(outcome.header().id)
        .await
        .expect("Failed to load instances");

    assert_eq!(instances.len(), 2);
    for instance in &instances {
        assert_eq!(instance.assignee_id, assignee);
        assert_eq!(instance.scheduled_date, date(2026, 1, 25));
        assert_eq!(instance.status, InstanceStatus::Pending);
        assert!(instance.completed_at.is_none());
    }
}

#[tokio::test]
async fn test_template_offsets_drive_scheduling() {
    let (engine, _temp_dir) = setup_test_engine().await;
    let template_id =
        create_test_template(engine.store(), &[Some(0), Some(2), Some(4)]).await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            template_id: Some(template_id),
            assignee_id: Some(Uuid::now_v7()),
            // Declared schedule is ignored when a template is present.
            schedule: ScheduleKind::Weekly,
            start_date: date(2026, 1, 25),
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    assert_eq!(outcome.instances_written(), 3);

    let instances = engine
        .store()
        .find_instances_for_assignment(outcome.header().id)
        .await
        .expect("Failed to load instances");

    let scheduled: Vec<NaiveDate> = instances.iter().map(|i| i.scheduled_date).collect();
    assert_eq!(
        scheduled,
        vec![date(2026, 1, 25), date(2026, 1, 27), date(2026, 1, 29)]
    );
}

#[tokio::test]
async fn test_group_fanout_creates_one_instance_per_member() {
    let (engine, _temp_dir) = setup_test_engine().await;
    let (group_id, mut members) = create_test_group(engine.store(), 3).await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            group_id: Some(group_id),
            schedule: ScheduleKind::Once,
            start_date: date(2026, 1, 25),
            tasks: vec![AdHocTask {
                name: "Clean the kitchen".to_string(),
                ..Default::default()
            }],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    assert_eq!(outcome.instances_written(), 3);

    let instances = engine
        .store()
        .find_instances_for_assignment(outcome.header().id)
        .await
        .expect("Failed to load instances");

    assert_eq!(instances.len(), 3);
    for instance in &instances {
        assert_eq!(instance.name, "Clean the kitchen");
        assert_eq!(instance.scheduled_date, date(2026, 1, 25));
    }

    let mut assigned: Vec<Uuid> = instances.iter().map(|i| i.assignee_id).collect();
    assigned.sort();
    members.sort();
    assert_eq!(assigned, members);
}

#[tokio::test]
async fn test_daily_recurrence_with_end_date() {
    let (engine, _temp_dir) = setup_test_engine().await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            assignee_id: Some(Uuid::now_v7()),
            schedule: ScheduleKind::Daily,
            start_date: date(2026, 1, 25),
            end_date: Some(date(2026, 1, 27)),
            tasks: vec![
                AdHocTask {
                    name: "Morning stretch".to_string(),
                    ..Default::default()
                },
                AdHocTask {
                    name: "Evening review".to_string(),
                    ..Default::default()
                },
            ],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    // 1 assignee x 3 dates x 2 tasks
    assert_eq!(outcome.instances_written(), 6);
}

#[tokio::test]
async fn test_custom_weekdays_recurrence() {
    let (engine, _temp_dir) = setup_test_engine().await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            assignee_id: Some(Uuid::now_v7()),
            schedule: ScheduleKind::Custom,
            schedule_days: vec![1, 3, 5],
            start_date: date(2026, 1, 26),
            end_date: Some(date(2026, 2, 1)),
            tasks: vec![AdHocTask {
                name: "Gym session".to_string(),
                ..Default::default()
            }],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    let instances = engine
        .store()
        .find_instances_for_assignment(outcome.header().id)
        .await
        .expect("Failed to load instances");

    let scheduled: Vec<NaiveDate> = instances.iter().map(|i| i.scheduled_date).collect();
    assert_eq!(
        scheduled,
        vec![date(2026, 1, 26), date(2026, 1, 28), date(2026, 1, 30)]
    );
}

#[tokio::test]
async fn test_weekly_inherits_weekday_from_start_date() {
    let (engine, _temp_dir) = setup_test_engine().await;
    let start = date(2026, 1, 25); // a Sunday

    let outcome = engine
        .create_assignment(NewAssignmentData {
            assignee_id: Some(Uuid::now_v7()),
            schedule: ScheduleKind::Weekly,
            start_date: start,
            end_date: Some(date(2026, 2, 8)),
            tasks: vec![AdHocTask {
                name: "Weekly planning".to_string(),
                ..Default::default()
            }],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    let instances = engine
        .store()
        .find_instances_for_assignment(outcome.header().id)
        .await
        .expect("Failed to load instances");

    assert_eq!(instances.len(), 3);
    for instance in &instances {
        assert_eq!(instance.scheduled_date.weekday(), start.weekday());
    }
}

#[tokio::test]
async fn test_explicit_task_dates_override_schedule() {
    let (engine, _temp_dir) = setup_test_engine().await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            assignee_id: Some(Uuid::now_v7()),
            schedule: ScheduleKind::Daily,
            start_date: date(2026, 1, 25),
            end_date: Some(date(2026, 2, 25)),
            tasks: vec![
                AdHocTask {
                    name: "File the report".to_string(),
                    due_date: Some(date(2026, 2, 2)),
                    ..Default::default()
                },
                AdHocTask {
                    name: "Book the venue".to_string(),
                    ..Default::default()
                },
            ],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    // Explicit dates suppress the daily expansion: one instance per task.
    assert_eq!(outcome.instances_written(), 2);

    let instances = engine
        .store()
        .find_instances_for_assignment(outcome.header().id)
        .await
        .expect("Failed to load instances");

    let dated: Vec<(&str, NaiveDate)> = instances
        .iter()
        .map(|i| (i.name.as_str(), i.scheduled_date))
        .collect();
    assert!(dated.contains(&("File the report", date(2026, 2, 2))));
    // Dateless tasks fall back to the assignment start date.
    assert!(dated.contains(&("Book the venue", date(2026, 1, 25))));
}

#[tokio::test]
async fn test_no_assignees_keeps_header() {
    let (engine, _temp_dir) = setup_test_engine().await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            schedule: ScheduleKind::Daily,
            start_date: date(2026, 1, 25),
            tasks: vec![AdHocTask {
                name: "Orphaned chore".to_string(),
                ..Default::default()
            }],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    assert!(matches!(outcome, CreateOutcome::NoAssignees { .. }));

    // The header survives even though nobody was assigned.
    let header = engine
        .store()
        .find_assignment_by_id(outcome.header().id)
        .await
        .expect("Failed to load assignment")
        .expect("Header should not have been rolled back");
    assert!(header.active);

    let instances = engine
        .store()
        .find_instances_for_assignment(header.id)
        .await
        .expect("Failed to load instances");
    assert!(instances.is_empty());
}

#[tokio::test]
async fn test_empty_group_resolves_to_no_assignees() {
    let (engine, _temp_dir) = setup_test_engine().await;
    let (group_id, _members) = create_test_group(engine.store(), 0).await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            group_id: Some(group_id),
            schedule: ScheduleKind::Once,
            start_date: date(2026, 1, 25),
            tasks: vec![AdHocTask {
                name: "Nobody's chore".to_string(),
                ..Default::default()
            }],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    assert!(matches!(outcome, CreateOutcome::NoAssignees { .. }));
}

#[tokio::test]
async fn test_repeated_creation_is_not_deduplicated() {
    let (engine, _temp_dir) = setup_test_engine().await;
    let assignee = Uuid::now_v7();

    let data = NewAssignmentData {
        assignee_id: Some(assignee),
        schedule: ScheduleKind::Once,
        start_date: date(2026, 1, 25),
        tasks: vec![AdHocTask {
            name: "Feed the cat".to_string(),
            ..Default::default()
        }],
        created_by: Uuid::now_v7(),
        ..Default::default()
    };

    let first = engine
        .create_assignment(data.clone())
        .await
        .expect("First creation failed");
    let second = engine
        .create_assignment(data)
        .await
        .expect("Second creation failed");

    assert_ne!(first.header().id, second.header().id);
    assert_eq!(first.instances_written(), 1);
    assert_eq!(second.instances_written(), 1);

    // Both instance sets exist side by side.
    for outcome in [&first, &second] {
        let instances = engine
            .store()
            .find_instances_for_assignment(outcome.header().id)
            .await
            .expect("Failed to load instances");
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].assignee_id, assignee);
        assert_eq!(instances[0].scheduled_date, date(2026, 1, 25));
    }
}

#[tokio::test]
async fn test_custom_schedule_days_roundtrip() {
    let (engine, _temp_dir) = setup_test_engine().await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            assignee_id: Some(Uuid::now_v7()),
            schedule: ScheduleKind::Custom,
            schedule_days: vec![0, 2, 6],
            start_date: date(2026, 1, 25),
            end_date: Some(date(2026, 1, 31)),
            tasks: vec![AdHocTask {
                name: "Practice piano".to_string(),
                ..Default::default()
            }],
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    let header = engine
        .store()
        .find_assignment_by_id(outcome.header().id)
        .await
        .expect("Failed to load assignment")
        .expect("Header should exist");

    assert_eq!(header.schedule, ScheduleKind::Custom);
    assert_eq!(header.schedule_days, vec![0, 2, 6]);
    assert_eq!(header.start_date, date(2026, 1, 25));
    assert_eq!(header.end_date, Some(date(2026, 1, 31)));
}

#[tokio::test]
async fn test_unknown_template_yields_header_without_instances() {
    let (engine, _temp_dir) = setup_test_engine().await;

    let outcome = engine
        .create_assignment(NewAssignmentData {
            template_id: Some(Uuid::now_v7()),
            assignee_id: Some(Uuid::now_v7()),
            schedule: ScheduleKind::Once,
            start_date: date(2026, 1, 25),
            created_by: Uuid::now_v7(),
            ..Default::default()
        })
        .await
        .expect("Failed to create assignment");

    assert!(matches!(
        outcome,
        CreateOutcome::Created {
            instances_written: 0,
            ..
        }
    ));
}
