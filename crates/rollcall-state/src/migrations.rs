//! SurrealDB schema migrations and initialization
//!
//! Sets up the `cohorts` and `attendance_events` tables with their
//! uniqueness constraints and lookup indexes. Safe to call multiple
//! times (idempotent).

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StateError;
use crate::Result;

/// Initialize all rollcall tables in SurrealDB
///
/// This should be called once on first connection to set up the schema.
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing rollcall SurrealDB schema");

    init_cohorts_table(db).await?;
    init_attendance_events_table(db).await?;

    info!("rollcall schema initialization complete");
    Ok(())
}

/// Initialize `cohorts` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE cohorts {
///   cohort_id:              STRING (external course id, unique)
///   attendance_quota_total: INT
///   class_count_total:      INT
///   teacher_ids:            ARRAY<STRING>
///   student_ids:            ARRAY<STRING>
///   created_at:             DATETIME
///   updated_at:             DATETIME
/// }
/// ```
///
/// Constraints:
/// - `cohort_id` is unique (one local mirror per external course)
/// - Id-list dedup and roster consistency are enforced via app logic
async fn init_cohorts_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing cohorts table");

    let sql = r#"
        DEFINE TABLE cohorts
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete FULL;

        -- One local mirror per external course
        DEFINE INDEX idx_cohort_id ON TABLE cohorts COLUMNS cohort_id UNIQUE;

        -- Index created_at for time-ordered listings
        DEFINE INDEX idx_cohort_created_at ON TABLE cohorts COLUMNS created_at;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ cohorts table initialized");
    Ok(())
}

/// Initialize `attendance_events` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE attendance_events {
///   event_id:            STRING (UUID, unique)
///   cohort_id:           STRING (foreign key to cohorts.cohort_id)
///   date:                DATETIME (one event per cohort per calendar day)
///   present_student_ids: ARRAY<STRING>
///   created_at:          DATETIME
///   updated_at:          DATETIME
/// }
/// ```
///
/// Constraints:
/// - `event_id` is unique
/// - Day-bounded uniqueness of `(cohort_id, date)` is enforced via app
///   logic (calendar-day window, not exact timestamp equality, so a plain
///   unique index cannot express it)
async fn init_attendance_events_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing attendance_events table");

    let sql = r#"
        DEFINE TABLE attendance_events
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete FULL;

        -- Ensure event_id is unique
        DEFINE INDEX idx_event_id ON TABLE attendance_events COLUMNS event_id UNIQUE;

        -- Index cohort_id for fast event retrieval by cohort
        DEFINE INDEX idx_event_cohort_id ON TABLE attendance_events COLUMNS cohort_id;

        -- Composite index (cohort_id, date) for day-window lookups and
        -- date-ordered listings
        DEFINE INDEX idx_event_cohort_id_date ON TABLE attendance_events COLUMNS cohort_id, date;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ attendance_events table initialized");
    Ok(())
}
