//! # Rota Core Library
//!
//! The assignment expansion engine behind Rota: it takes an assignment
//! definition — a task source (template or ad hoc list), a target (one
//! person or a whole group) and a schedule (once, daily, weekly or a custom
//! weekday set) — and materializes it into concrete, dated task instances,
//! one row per (assignee, date, task).
//!
//! ## Features
//!
//! - **Group Fan-Out**: one assignment targeting a group becomes one
//!   instance per member
//! - **Schedule Expansion**: deterministic calendar-date generation for
//!   once/daily/weekly/custom schedules, testable without a clock
//! - **Template Offsets**: reusable templates schedule their tasks by
//!   day-offset from the assignment's start date
//! - **Date Precedence**: explicit per-task dates, template offsets, single
//!   date and recurring expansion selected by one pure decision function
//! - **Compensating Rollback**: the header is deleted again when the
//!   instance batch write fails, so a failed creation leaves nothing behind
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with store traits
//! - [`recurrence`]: Date expansion, date-source policy and instance fan-out
//! - [`engine`]: The transactional assignment creator
//! - [`error`]: Error types with context
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rota_core::{
//!     db, engine::AssignmentEngine,
//!     models::{AdHocTask, NewAssignmentData, ScheduleKind},
//!     repository::SqliteStore,
//! };
//! use chrono::NaiveDate;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rota_core::error::CoreError> {
//!     let pool = db::establish_connection("rota.db").await?;
//!     let engine = AssignmentEngine::new(SqliteStore::new(pool));
//!
//!     // Assign a daily chore to one person for the default 30-day window.
//!     let outcome = engine
//!         .create_assignment(NewAssignmentData {
//!             assignee_id: Some(Uuid::now_v7()),
//!             schedule: ScheduleKind::Daily,
//!             start_date: NaiveDate::from_ymd_opt(2026, 1, 25).unwrap(),
//!             tasks: vec![AdHocTask {
//!                 name: "Water the plants".to_string(),
//!                 ..Default::default()
//!             }],
//!             created_by: Uuid::now_v7(),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     println!("created {} instances", outcome.instances_written());
//!     Ok(())
//! }
//! ```
//!
//! Creating the same assignment twice produces two independent instance
//! sets; the engine does not deduplicate, and a person reachable both
//! directly and through a group in the same call is not collapsed either.

pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
