//! Rollcall Core Library
//!
//! Cohort synchronization and attendance-event lifecycle over pluggable
//! storage and roster-source ports. Re-exports the collaborator types so
//! binaries can depend on this crate alone.

pub mod attendance;
pub mod domain;
pub mod obs;
pub mod sync;
pub mod telemetry;

pub use attendance::{AttendanceEventManager, AttendanceStats, EventPatch};
pub use domain::error::{Result, RollcallError};
pub use sync::CohortSyncCoordinator;

pub use rollcall_roster::{
    ClassroomClient, ClassroomConfig, Course, Credentials, RosterMember, RosterSource,
};

pub use rollcall_state::{
    day_bounds, AttendanceEvent, Cohort, CohortStore, DbConfig, EventId, EventStore, StorageError,
    StorageResult, SurrealStore,
};

pub use obs::{
    emit_attendance_changed, emit_cohort_synced, emit_event_created, emit_member_healed,
    emit_sync_failed, SyncSpan,
};
pub use telemetry::init_tracing;

/// Rollcall version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
