//! Attendance-event lifecycle: creation, mutation, deletion, statistics.
//!
//! Every operation that touches an event enters through
//! [`AttendanceEventManager`], which delegates all roster questions to
//! [`CohortSyncCoordinator`] before mutating anything. Events are unique
//! per cohort per calendar day, and every present id must be a confirmed
//! roster member at the moment it is recorded.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rollcall_roster::{Credentials, RosterSource};
use rollcall_state::{AttendanceEvent, Cohort, CohortStore, EventId, EventStore};

use crate::domain::error::{Result, RollcallError};
use crate::obs;
use crate::sync::CohortSyncCoordinator;

/// Partial update for an attendance event.
///
/// Absent fields are left untouched; `present_ids` replaces the whole
/// present list rather than merging into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    /// Replacement session timestamp
    pub date: Option<DateTime<Utc>>,
    /// Replacement present list (validated, then swapped in whole)
    pub present_ids: Option<Vec<String>>,
}

impl EventPatch {
    /// Set a replacement date.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Set a replacement present list.
    pub fn with_present_ids(mut self, present_ids: Vec<String>) -> Self {
        self.present_ids = Some(present_ids);
        self
    }
}

/// Derived attendance figures for one event against its cohort roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceStats {
    /// Roster size of the owning cohort
    pub total: usize,
    /// Number of students recorded present
    pub present: usize,
    /// `present / total * 100`, rounded to two decimals; 0 for an empty
    /// roster
    pub percentage: f64,
    /// Roster ids not recorded present, in roster order
    pub absent: Vec<String>,
}

impl AttendanceStats {
    /// Compute stats for an event against its cohort's student roster.
    pub fn from_event(cohort: &Cohort, event: &AttendanceEvent) -> Self {
        let total = cohort.student_ids.len();
        let present = event.present_count();

        let percentage = if total == 0 {
            0.0
        } else {
            ((present as f64 / total as f64) * 100.0 * 100.0).round() / 100.0
        };

        let absent = cohort
            .student_ids
            .iter()
            .filter(|id| !event.is_present(id))
            .cloned()
            .collect();

        AttendanceStats {
            total,
            present,
            percentage,
            absent,
        }
    }
}

/// Owns the attendance-event lifecycle for cohorts mirrored by a
/// [`CohortSyncCoordinator`].
///
/// Usage:
/// 1. Construct with [`AttendanceEventManager::new`] over a cohort store,
///    an event store, and a roster source.
/// 2. Call the lifecycle operations; each one ensures the cohort and the
///    referenced members are valid before mutating state.
pub struct AttendanceEventManager<C, E, R> {
    sync: CohortSyncCoordinator<C, R>,
    events: E,
}

impl<C, E, R> AttendanceEventManager<C, E, R>
where
    C: CohortStore,
    E: EventStore,
    R: RosterSource,
{
    /// Create a manager over the given stores and roster source.
    pub fn new(cohorts: C, events: E, roster: R) -> Self {
        AttendanceEventManager {
            sync: CohortSyncCoordinator::new(cohorts, roster),
            events,
        }
    }

    /// The embedded sync coordinator, for direct cohort queries.
    pub fn sync(&self) -> &CohortSyncCoordinator<C, R> {
        &self.sync
    }

    /// Create a dated attendance event for a cohort.
    ///
    /// Ensures the cohort exists (syncing on a local miss), rejects a
    /// second event on the same calendar day with `DuplicateEvent`, and
    /// validates every claimed present id through the self-healing
    /// membership check. The first invalid id aborts the whole create;
    /// nothing is persisted on failure.
    pub async fn create(
        &self,
        cohort_id: &str,
        date: DateTime<Utc>,
        present_ids: &[String],
        credentials: &Credentials,
    ) -> Result<AttendanceEvent> {
        self.sync.ensure_cohort(cohort_id, credentials).await?;

        if self
            .events
            .find_by_cohort_and_day(cohort_id, date)
            .await?
            .is_some()
        {
            return Err(RollcallError::DuplicateEvent {
                cohort_id: cohort_id.to_string(),
                date: date.date_naive(),
            });
        }

        for student_id in present_ids {
            self.sync
                .ensure_member(cohort_id, student_id, credentials)
                .await?;
        }

        let mut event = AttendanceEvent::new(cohort_id, date, Vec::new());
        for student_id in present_ids {
            event.mark_present(student_id.as_str());
        }

        let saved = self.events.save(event).await?;
        obs::emit_event_created(&saved.id.to_string(), cohort_id, saved.date);
        Ok(saved)
    }

    /// Fetch an event by id, failing `EventNotFound` when absent.
    pub async fn get(&self, event_id: &EventId) -> Result<AttendanceEvent> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| RollcallError::EventNotFound(event_id.to_string()))
    }

    /// Apply a partial update to an event.
    ///
    /// A date replacement is taken as given: day-uniqueness is enforced
    /// at create time only, so a date change can land on a day that
    /// already has an event. A present-list replacement validates every
    /// id through the membership check first, then swaps the whole list.
    pub async fn update(
        &self,
        event_id: &EventId,
        patch: EventPatch,
        credentials: &Credentials,
    ) -> Result<AttendanceEvent> {
        let mut event = self.get(event_id).await?;

        if let Some(date) = patch.date {
            event.set_date(date);
        }

        if let Some(present_ids) = patch.present_ids {
            for student_id in &present_ids {
                self.sync
                    .ensure_member(&event.cohort_id, student_id, credentials)
                    .await?;
            }
            event.set_present(present_ids);
        }

        Ok(self.events.update(&event).await?)
    }

    /// List a cohort's events, ordered by date ascending.
    ///
    /// Listing never contacts the roster source; an unknown local cohort
    /// fails `CohortNotFound`.
    pub async fn list_by_cohort(&self, cohort_id: &str) -> Result<Vec<AttendanceEvent>> {
        if self.sync.find_local(cohort_id).await?.is_none() {
            return Err(RollcallError::CohortNotFound(cohort_id.to_string()));
        }
        Ok(self.events.find_by_cohort(cohort_id).await?)
    }

    /// Delete an event by id, failing `EventNotFound` when absent.
    pub async fn delete(&self, event_id: &EventId) -> Result<()> {
        self.get(event_id).await?;
        Ok(self.events.delete(event_id).await?)
    }

    /// Record one student present, healing the roster if needed.
    ///
    /// Idempotent: an already-present id leaves the set unchanged.
    pub async fn add_present(
        &self,
        event_id: &EventId,
        student_id: &str,
        credentials: &Credentials,
    ) -> Result<AttendanceEvent> {
        let mut event = self.get(event_id).await?;

        self.sync
            .ensure_member(&event.cohort_id, student_id, credentials)
            .await?;

        event.mark_present(student_id);
        let updated = self.events.update(&event).await?;
        obs::emit_attendance_changed(&updated.id.to_string(), "add", updated.present_count());
        Ok(updated)
    }

    /// Remove one student from the present set.
    ///
    /// Idempotent: an absent id leaves the set unchanged. No membership
    /// validation; removal needs none.
    pub async fn remove_present(
        &self,
        event_id: &EventId,
        student_id: &str,
    ) -> Result<AttendanceEvent> {
        let mut event = self.get(event_id).await?;

        event.clear_present(student_id);
        let updated = self.events.update(&event).await?;
        obs::emit_attendance_changed(&updated.id.to_string(), "remove", updated.present_count());
        Ok(updated)
    }

    /// Record many students present in one call.
    ///
    /// Membership is checked against the mirrored roster directly: the
    /// cohort is ensured once (syncing on a local miss) and every id must
    /// already be on its student list — unlike
    /// [`add_present`](Self::add_present), the bulk path performs no
    /// per-id healing. One unknown id fails `InvalidMember` with the
    /// event untouched and unpersisted. Already-present ids are skipped;
    /// the event is persisted once at the end.
    pub async fn add_present_many(
        &self,
        event_id: &EventId,
        student_ids: &[String],
        credentials: &Credentials,
    ) -> Result<AttendanceEvent> {
        let mut event = self.get(event_id).await?;

        let cohort = self
            .sync
            .ensure_cohort(&event.cohort_id, credentials)
            .await?;
        for student_id in student_ids {
            if !cohort.has_student(student_id) {
                return Err(RollcallError::InvalidMember {
                    cohort_id: event.cohort_id.clone(),
                    student_id: student_id.clone(),
                });
            }
        }

        for student_id in student_ids {
            event.mark_present(student_id.as_str());
        }

        let updated = self.events.update(&event).await?;
        obs::emit_attendance_changed(&updated.id.to_string(), "add", updated.present_count());
        Ok(updated)
    }

    /// Remove many students from the present set in one call.
    ///
    /// Absent ids are no-ops; the event is persisted once at the end.
    pub async fn remove_present_many(
        &self,
        event_id: &EventId,
        student_ids: &[String],
    ) -> Result<AttendanceEvent> {
        let mut event = self.get(event_id).await?;

        for student_id in student_ids {
            event.clear_present(student_id);
        }

        let updated = self.events.update(&event).await?;
        obs::emit_attendance_changed(&updated.id.to_string(), "remove", updated.present_count());
        Ok(updated)
    }

    /// Compute attendance statistics for an event against its cohort.
    pub async fn stats(&self, event_id: &EventId) -> Result<AttendanceStats> {
        let event = self.get(event_id).await?;

        let cohort = self
            .sync
            .find_local(&event.cohort_id)
            .await?
            .ok_or_else(|| RollcallError::CohortNotFound(event.cohort_id.clone()))?;

        Ok(AttendanceStats::from_event(&cohort, &event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn cohort_of(students: &[&str]) -> Cohort {
        Cohort::from_rosters(
            "CS101",
            vec!["t1".to_string()],
            students.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn event_of(present: &[&str]) -> AttendanceEvent {
        AttendanceEvent::new(
            "CS101",
            ts("2024-03-01T10:00:00Z"),
            present.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn stats_empty_roster_is_all_zero() {
        let stats = AttendanceStats::from_event(&cohort_of(&[]), &event_of(&[]));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.present, 0);
        assert_eq!(stats.percentage, 0.0);
        assert!(stats.absent.is_empty());
    }

    #[test]
    fn stats_two_of_three_rounds_to_two_decimals() {
        let stats = AttendanceStats::from_event(&cohort_of(&["s1", "s2", "s3"]), &event_of(&["s1", "s2"]));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.present, 2);
        assert_eq!(stats.percentage, 66.67);
        assert_eq!(stats.absent, vec!["s3".to_string()]);
    }

    #[test]
    fn stats_one_of_three_rounds_down() {
        let stats = AttendanceStats::from_event(&cohort_of(&["s1", "s2", "s3"]), &event_of(&["s2"]));
        assert_eq!(stats.percentage, 33.33);
    }

    #[test]
    fn stats_full_attendance_is_hundred() {
        let stats = AttendanceStats::from_event(&cohort_of(&["s1", "s2"]), &event_of(&["s1", "s2"]));
        assert_eq!(stats.percentage, 100.0);
        assert!(stats.absent.is_empty());
    }

    #[test]
    fn stats_absent_preserves_roster_order() {
        let stats = AttendanceStats::from_event(
            &cohort_of(&["s1", "s2", "s3", "s4"]),
            &event_of(&["s3", "s1"]),
        );
        assert_eq!(stats.absent, vec!["s2".to_string(), "s4".to_string()]);
    }

    #[test]
    fn patch_builders_set_fields() {
        let patch = EventPatch::default()
            .with_date(ts("2024-03-02T10:00:00Z"))
            .with_present_ids(vec!["s1".to_string()]);

        assert_eq!(patch.date, Some(ts("2024-03-02T10:00:00Z")));
        assert_eq!(patch.present_ids, Some(vec!["s1".to_string()]));
    }
}
