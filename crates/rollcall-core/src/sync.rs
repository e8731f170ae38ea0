//! Cohort synchronization: local mirror adapter over the external roster.
//!
//! The external classroom service owns every roster; this module keeps a
//! local, queryable copy just consistent enough for attendance bookkeeping.
//! Policy is **sync-once, heal-on-demand**: a cohort is fetched in full the
//! first time it is needed and never re-fetched wholesale afterwards;
//! individual roster drift is corrected member-by-member when an attendance
//! operation trips over an id the mirror does not know yet.

use rollcall_roster::{Credentials, RosterSource};
use rollcall_state::{Cohort, CohortStore};

use crate::domain::error::{Result, RollcallError};
use crate::obs;

/// Guarantees a requested cohort exists locally and that claimed members
/// really belong to it.
///
/// Usage:
/// 1. Call [`CohortSyncCoordinator::ensure_cohort`] before any operation
///    that needs the cohort to exist.
/// 2. Call [`CohortSyncCoordinator::ensure_member`] before trusting a
///    student id; it self-heals local drift from the source of truth.
pub struct CohortSyncCoordinator<C, R> {
    cohorts: C,
    roster: R,
}

impl<C, R> CohortSyncCoordinator<C, R>
where
    C: CohortStore,
    R: RosterSource,
{
    /// Create a coordinator over a cohort store and a roster source.
    pub fn new(cohorts: C, roster: R) -> Self {
        CohortSyncCoordinator { cohorts, roster }
    }

    /// Look up a cohort locally, never contacting the roster source.
    pub async fn find_local(&self, cohort_id: &str) -> Result<Option<Cohort>> {
        Ok(self.cohorts.find_by_id(cohort_id).await?)
    }

    /// List every locally mirrored cohort.
    pub async fn list_local(&self) -> Result<Vec<Cohort>> {
        Ok(self.cohorts.find_all().await?)
    }

    /// Return the cohort, mirroring it from the roster source on a local
    /// miss.
    ///
    /// A local hit is returned as-is with no freshness check: once
    /// mirrored, a cohort is only ever corrected through
    /// [`ensure_member`](Self::ensure_member), never re-fetched in full.
    /// Fails `CohortNotFound` when the cohort is absent locally and no
    /// mirror could be obtained and persisted.
    pub async fn ensure_cohort(
        &self,
        cohort_id: &str,
        credentials: &Credentials,
    ) -> Result<Cohort> {
        if let Some(cohort) = self.cohorts.find_by_id(cohort_id).await? {
            return Ok(cohort);
        }

        match self.sync_from_source(cohort_id, credentials).await? {
            Some(cohort) => Ok(cohort),
            None => Err(RollcallError::CohortNotFound(cohort_id.to_string())),
        }
    }

    /// Mirror one course from the roster source, persisting the result.
    ///
    /// Returns `Ok(None)` when no cohort could be mirrored — an absent
    /// course, an unreachable provider, and a failed local persist are
    /// all soft outcomes here, logged and downgraded rather than raised.
    /// Both aggregate totals start at 0; the id lists are taken verbatim
    /// from the fetched rosters.
    pub async fn sync_from_source(
        &self,
        course_id: &str,
        credentials: &Credentials,
    ) -> Result<Option<Cohort>> {
        let _span = obs::SyncSpan::enter(course_id);

        let Some(course) = self.roster.fetch_course(course_id, credentials).await else {
            obs::emit_sync_failed(course_id, "course unavailable upstream");
            return Ok(None);
        };

        let students = self.roster.fetch_students(&course.id, credentials).await;
        let teachers = self.roster.fetch_teachers(&course.id, credentials).await;

        let cohort = Cohort::from_rosters(
            &course.id,
            teachers.into_iter().map(|m| m.user_id).collect(),
            students.into_iter().map(|m| m.user_id).collect(),
        );

        let saved = match self.cohorts.save(cohort).await {
            Ok(saved) => saved,
            Err(err) => {
                obs::emit_sync_failed(course_id, &format!("mirror not persisted: {err}"));
                return Ok(None);
            }
        };
        obs::emit_cohort_synced(&saved.id, saved.student_ids.len(), saved.teacher_ids.len());
        Ok(Some(saved))
    }

    /// Confirm a student belongs to the cohort, healing local drift.
    ///
    /// Ensures the cohort first (syncing on a local miss). A student
    /// already on the local roster is confirmed without any external
    /// call. Otherwise the source is asked about that one student: if
    /// enrolled there, the id is appended to the local roster and the
    /// update persisted (the self-healing path); if the source does not
    /// know the student either, fails `InvalidMember`.
    ///
    /// Idempotent: repeat calls for a valid or just-healed id are local
    /// no-ops.
    pub async fn ensure_member(
        &self,
        cohort_id: &str,
        student_id: &str,
        credentials: &Credentials,
    ) -> Result<Cohort> {
        let cohort = self.ensure_cohort(cohort_id, credentials).await?;
        if cohort.has_student(student_id) {
            return Ok(cohort);
        }

        match self
            .roster
            .fetch_student(cohort_id, student_id, credentials)
            .await
        {
            Some(_member) => {
                let mut student_ids = cohort.student_ids;
                student_ids.push(student_id.to_string());

                let updated = self
                    .cohorts
                    .update_rosters(cohort_id, cohort.teacher_ids, student_ids)
                    .await?;
                obs::emit_member_healed(cohort_id, student_id);
                Ok(updated)
            }
            None => Err(RollcallError::InvalidMember {
                cohort_id: cohort_id.to_string(),
                student_id: student_id.to_string(),
            }),
        }
    }
}
