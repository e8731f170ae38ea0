//! Integration tests for CohortSyncCoordinator (roster source → local mirror).

use async_trait::async_trait;
use rollcall_core::sync::CohortSyncCoordinator;
use rollcall_core::{Credentials, RollcallError};
use rollcall_roster::fakes::StaticRoster;
use rollcall_roster::{Course, RosterMember};
use rollcall_state::fakes::MemoryCohortStore;
use rollcall_state::{Cohort, CohortStore, StorageError, StorageResult};

fn creds() -> Credentials {
    Credentials::new("test-token")
}

fn members(ids: &[&str]) -> Vec<RosterMember> {
    ids.iter().map(|id| RosterMember::new(*id)).collect()
}

fn seeded_roster() -> StaticRoster {
    let roster = StaticRoster::new();
    roster.add_course(Course::new("CS101", "Intro to Programming"));
    roster.set_students("CS101", members(&["s1", "s2", "s3"]));
    roster.set_teachers("CS101", members(&["t1"]));
    roster
}

/// Cohort store whose writes always fail, for exercising the soft-failure
/// policy at the sync boundary.
#[derive(Debug, Clone)]
struct BrokenCohortStore;

#[async_trait]
impl CohortStore for BrokenCohortStore {
    async fn find_by_id(&self, _id: &str) -> StorageResult<Option<Cohort>> {
        Ok(None)
    }

    async fn find_all(&self) -> StorageResult<Vec<Cohort>> {
        Ok(Vec::new())
    }

    async fn save(&self, _cohort: Cohort) -> StorageResult<Cohort> {
        Err(StorageError::Backend("no space left on device".to_string()))
    }

    async fn update_rosters(
        &self,
        id: &str,
        _teacher_ids: Vec<String>,
        _student_ids: Vec<String>,
    ) -> StorageResult<Cohort> {
        Err(StorageError::CohortNotFound {
            cohort_id: id.to_string(),
        })
    }

    async fn delete(&self, _id: &str) -> StorageResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn sync_mirrors_external_roster_id_sets() {
    let roster = seeded_roster();
    let store = MemoryCohortStore::new();
    let coordinator = CohortSyncCoordinator::new(store.clone(), roster);

    let cohort = coordinator
        .sync_from_source("CS101", &creds())
        .await
        .expect("sync")
        .expect("cohort");

    assert_eq!(cohort.id, "CS101");
    assert_eq!(cohort.student_ids, vec!["s1", "s2", "s3"]);
    assert_eq!(cohort.teacher_ids, vec!["t1"]);
    assert_eq!(cohort.attendance_quota_total, 0);
    assert_eq!(cohort.class_count_total, 0);

    // Persisted under its external id
    let stored = store.find_by_id("CS101").await.expect("find").expect("stored");
    assert_eq!(stored.student_ids, cohort.student_ids);
}

#[tokio::test]
async fn sync_unknown_course_is_none_not_error() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(MemoryCohortStore::new(), roster);

    let outcome = coordinator
        .sync_from_source("NOPE999", &creds())
        .await
        .expect("sync must not error");
    assert!(outcome.is_none());
}

#[tokio::test]
async fn sync_offline_source_is_none_not_error() {
    let roster = seeded_roster();
    roster.set_offline(true);
    let coordinator = CohortSyncCoordinator::new(MemoryCohortStore::new(), roster);

    let outcome = coordinator
        .sync_from_source("CS101", &creds())
        .await
        .expect("sync must not error");
    assert!(outcome.is_none());
}

#[tokio::test]
async fn sync_save_failure_is_none_not_error() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(BrokenCohortStore, roster);

    // Course and rosters fetch fine; only the local write fails.
    let outcome = coordinator
        .sync_from_source("CS101", &creds())
        .await
        .expect("sync must not error");
    assert!(outcome.is_none());
}

#[tokio::test]
async fn ensure_cohort_escalates_unpersistable_mirror_to_not_found() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(BrokenCohortStore, roster);

    let err = coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect_err("must fail");
    assert!(matches!(err, RollcallError::CohortNotFound(id) if id == "CS101"));
}

#[tokio::test]
async fn ensure_cohort_syncs_on_first_access() {
    let roster = seeded_roster();
    let store = MemoryCohortStore::new();
    let coordinator = CohortSyncCoordinator::new(store.clone(), roster);

    let cohort = coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("ensure_cohort");

    assert_eq!(cohort.student_ids.len(), 3);
    assert!(store.find_by_id("CS101").await.expect("find").is_some());
}

#[tokio::test]
async fn ensure_cohort_local_hit_needs_no_source() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(MemoryCohortStore::new(), roster.clone());

    coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("first ensure");

    // A provider outage must not matter once the cohort is mirrored.
    roster.set_offline(true);

    let cohort = coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("second ensure");
    assert_eq!(cohort.student_ids, vec!["s1", "s2", "s3"]);
}

#[tokio::test]
async fn ensure_cohort_never_refetches_wholesale() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(MemoryCohortStore::new(), roster.clone());

    coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("first ensure");

    // Upstream drift after the initial mirror...
    roster.enroll_student("CS101", RosterMember::new("s4"));

    // ...is not picked up by ensure_cohort alone.
    let cohort = coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("second ensure");
    assert!(!cohort.has_student("s4"));
}

#[tokio::test]
async fn ensure_cohort_unknown_everywhere_fails() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(MemoryCohortStore::new(), roster);

    let err = coordinator
        .ensure_cohort("NOPE999", &creds())
        .await
        .expect_err("must fail");
    assert!(matches!(err, RollcallError::CohortNotFound(id) if id == "NOPE999"));
}

#[tokio::test]
async fn ensure_member_known_id_is_local_noop() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(MemoryCohortStore::new(), roster.clone());

    coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("ensure cohort");
    roster.set_offline(true);

    // s1 is already on the local roster; no external call is needed.
    let cohort = coordinator
        .ensure_member("CS101", "s1", &creds())
        .await
        .expect("ensure_member");
    assert!(cohort.has_student("s1"));
}

#[tokio::test]
async fn ensure_member_heals_roster_drift() {
    let roster = seeded_roster();
    let store = MemoryCohortStore::new();
    let coordinator = CohortSyncCoordinator::new(store.clone(), roster.clone());

    coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("ensure cohort");

    // s4 enrolls upstream after the mirror was taken.
    roster.enroll_student("CS101", RosterMember::new("s4"));

    let cohort = coordinator
        .ensure_member("CS101", "s4", &creds())
        .await
        .expect("heal");
    assert!(cohort.has_student("s4"));

    // The heal was persisted, not just returned.
    let stored = store.find_by_id("CS101").await.expect("find").expect("stored");
    assert!(stored.has_student("s4"));
}

#[tokio::test]
async fn ensure_member_idempotent_after_heal() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(MemoryCohortStore::new(), roster.clone());

    coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("ensure cohort");
    roster.enroll_student("CS101", RosterMember::new("s4"));

    coordinator
        .ensure_member("CS101", "s4", &creds())
        .await
        .expect("first heal");
    let cohort = coordinator
        .ensure_member("CS101", "s4", &creds())
        .await
        .expect("second call");

    let occurrences = cohort.student_ids.iter().filter(|s| *s == "s4").count();
    assert_eq!(occurrences, 1);
}

#[tokio::test]
async fn ensure_member_unknown_everywhere_fails_and_leaves_roster_alone() {
    let roster = seeded_roster();
    let store = MemoryCohortStore::new();
    let coordinator = CohortSyncCoordinator::new(store.clone(), roster);

    coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("ensure cohort");

    let err = coordinator
        .ensure_member("CS101", "s9", &creds())
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        RollcallError::InvalidMember { cohort_id, student_id }
            if cohort_id == "CS101" && student_id == "s9"
    ));

    let stored = store.find_by_id("CS101").await.expect("find").expect("stored");
    assert_eq!(stored.student_ids, vec!["s1", "s2", "s3"]);
}

#[tokio::test]
async fn ensure_member_syncs_missing_cohort_first() {
    let roster = seeded_roster();
    let store = MemoryCohortStore::new();
    let coordinator = CohortSyncCoordinator::new(store.clone(), roster);

    // Nothing mirrored yet; ensure_member pulls the cohort on its own.
    let cohort = coordinator
        .ensure_member("CS101", "s2", &creds())
        .await
        .expect("ensure_member");

    assert!(cohort.has_student("s2"));
    assert!(store.find_by_id("CS101").await.expect("find").is_some());
}

#[tokio::test]
async fn find_local_and_list_local_never_sync() {
    let roster = seeded_roster();
    let coordinator = CohortSyncCoordinator::new(MemoryCohortStore::new(), roster);

    // CS101 exists upstream but was never mirrored.
    assert!(coordinator
        .find_local("CS101")
        .await
        .expect("find_local")
        .is_none());
    assert!(coordinator.list_local().await.expect("list_local").is_empty());

    coordinator
        .ensure_cohort("CS101", &creds())
        .await
        .expect("ensure");

    assert!(coordinator
        .find_local("CS101")
        .await
        .expect("find_local")
        .is_some());
    assert_eq!(coordinator.list_local().await.expect("list_local").len(), 1);
}
