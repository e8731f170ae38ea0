//! Structured observability hooks for rollcall sync and attendance events.
//!
//! This module provides:
//! - Sync-scoped tracing spans via the `SyncSpan` RAII guard
//! - Emission functions for key lifecycle events: cohort synced, member
//!   healed, event created, attendance changed
//!
//! Events are emitted at `info!` level (filterable via `RUST_LOG`); soft
//! sync failures are emitted at `warn!` so operators see downgraded
//! roster-source problems without callers failing.

use tracing::info;

/// RAII guard that enters a sync-scoped tracing span for the duration of
/// one roster synchronization.
///
/// # Example
///
/// ```ignore
/// let _span = SyncSpan::enter("CS101");
/// // Tracing calls are now associated with course_id = "CS101"
/// ```
pub struct SyncSpan {
    _span: tracing::span::EnteredSpan,
}

impl SyncSpan {
    /// Create and enter a span tagged with the course id.
    pub fn enter(course_id: &str) -> Self {
        let span = tracing::info_span!("rollcall.sync", course_id = %course_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: cohort mirrored from the roster source.
pub fn emit_cohort_synced(cohort_id: &str, students: usize, teachers: usize) {
    info!(
        event = "cohort.synced",
        cohort_id = %cohort_id,
        students = students,
        teachers = teachers,
    );
}

/// Emit event: a sync attempt yielded no cohort (warning level).
pub fn emit_sync_failed(course_id: &str, reason: &str) {
    tracing::warn!(event = "cohort.sync_failed", course_id = %course_id, reason = %reason);
}

/// Emit event: a missing member was confirmed upstream and appended to
/// the local roster.
pub fn emit_member_healed(cohort_id: &str, student_id: &str) {
    info!(event = "cohort.member_healed", cohort_id = %cohort_id, student_id = %student_id);
}

/// Emit event: attendance event created.
pub fn emit_event_created(event_id: &str, cohort_id: &str, date: chrono::DateTime<chrono::Utc>) {
    info!(
        event = "attendance.created",
        event_id = %event_id,
        cohort_id = %cohort_id,
        date = %date,
    );
}

/// Emit event: present set changed, with the resulting present count.
pub fn emit_attendance_changed(event_id: &str, action: &str, present: usize) {
    info!(
        event = "attendance.changed",
        event_id = %event_id,
        action = %action,
        present = present,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_span_create() {
        // Just ensure SyncSpan::enter doesn't panic
        let _span = SyncSpan::enter("CS101");
    }
}
