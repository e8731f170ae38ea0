//! Storage trait definitions for rollcall
//!
//! These traits define the persistence abstractions the core works against:
//! - `CohortStore`: local mirrors of external courses (roster copies)
//! - `EventStore`: dated attendance events owned by a cohort
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Inclusive calendar-day bounds for a timestamp, in UTC.
///
/// Returns `(start, end)` where `start` is 00:00:00.000 and `end` is
/// 23:59:59.999 of the same day. Used for day-bounded uniqueness checks:
/// two events collide when their dates fall inside the same bounds,
/// regardless of time-of-day.
pub fn day_bounds(date: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

// ---------------------------------------------------------------------------
// Cohort — Local Mirror of an External Course
// ---------------------------------------------------------------------------

/// One external course mirrored locally.
///
/// The `id` is the external course identifier, not locally generated: a
/// cohort exists locally only after a successful roster sync, and the
/// external service stays the source of truth for membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    /// External course identifier (stable, primary key)
    pub id: String,
    /// Aggregate attendance target, computed elsewhere; 0 at creation
    pub attendance_quota_total: u32,
    /// Aggregate class-count target, computed elsewhere; 0 at creation
    pub class_count_total: u32,
    /// External teacher user ids, insertion-ordered, no duplicates
    pub teacher_ids: Vec<String>,
    /// External student user ids, insertion-ordered, no duplicates.
    /// This is the authoritative local membership list.
    pub student_ids: Vec<String>,
    /// When the cohort was first synced locally
    pub created_at: DateTime<Utc>,
    /// Advances on every roster mutation
    pub updated_at: DateTime<Utc>,
}

impl Cohort {
    /// Create a cohort from freshly fetched rosters.
    ///
    /// Both aggregate totals start at 0; the id lists are taken as given
    /// (callers pass the external rosters verbatim).
    pub fn from_rosters(
        id: impl Into<String>,
        teacher_ids: Vec<String>,
        student_ids: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Cohort {
            id: id.into(),
            attendance_quota_total: 0,
            class_count_total: 0,
            teacher_ids,
            student_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given external user id is a known student of this cohort.
    pub fn has_student(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|s| s == student_id)
    }

    /// Set-add a student id (no-op if already present).
    pub fn add_student(&mut self, student_id: impl Into<String>) {
        let student_id = student_id.into();
        if !self.has_student(&student_id) {
            self.student_ids.push(student_id);
            self.updated_at = Utc::now();
        }
    }

    /// Remove a student id (no-op if absent).
    pub fn remove_student(&mut self, student_id: &str) {
        if self.has_student(student_id) {
            self.student_ids.retain(|s| s != student_id);
            self.updated_at = Utc::now();
        }
    }

    /// Set-add a teacher id (no-op if already present).
    pub fn add_teacher(&mut self, teacher_id: impl Into<String>) {
        let teacher_id = teacher_id.into();
        if !self.teacher_ids.iter().any(|t| t == &teacher_id) {
            self.teacher_ids.push(teacher_id);
            self.updated_at = Utc::now();
        }
    }

    /// Remove a teacher id (no-op if absent).
    pub fn remove_teacher(&mut self, teacher_id: &str) {
        if self.teacher_ids.iter().any(|t| t == teacher_id) {
            self.teacher_ids.retain(|t| t != teacher_id);
            self.updated_at = Utc::now();
        }
    }
}

// ---------------------------------------------------------------------------
// AttendanceEvent — One Dated Class Session
// ---------------------------------------------------------------------------

/// Unique identifier for an attendance event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// Generate a new random EventId
    pub fn new() -> Self {
        EventId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One dated class session of a cohort, with the recorded present set.
///
/// At most one event may exist per cohort per calendar day; the present
/// list holds external student ids, insertion-ordered, no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Locally generated unique identifier
    pub id: EventId,
    /// Owning cohort (external course id)
    pub cohort_id: String,
    /// Session timestamp; uniqueness is per calendar day, not per instant
    pub date: DateTime<Utc>,
    /// External student ids recorded present, insertion-ordered, no duplicates
    pub present_student_ids: Vec<String>,
    /// When the event was created
    pub created_at: DateTime<Utc>,
    /// Advances on every mutation
    pub updated_at: DateTime<Utc>,
}

impl AttendanceEvent {
    /// Create a new event with a generated id.
    pub fn new(
        cohort_id: impl Into<String>,
        date: DateTime<Utc>,
        present_student_ids: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        AttendanceEvent {
            id: EventId::new(),
            cohort_id: cohort_id.into(),
            date,
            present_student_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given student id is recorded present.
    pub fn is_present(&self, student_id: &str) -> bool {
        self.present_student_ids.iter().any(|s| s == student_id)
    }

    /// Set-add a student id to the present list (no-op if already present).
    pub fn mark_present(&mut self, student_id: impl Into<String>) {
        let student_id = student_id.into();
        if !self.is_present(&student_id) {
            self.present_student_ids.push(student_id);
            self.updated_at = Utc::now();
        }
    }

    /// Remove a student id from the present list (no-op if absent).
    pub fn clear_present(&mut self, student_id: &str) {
        if self.is_present(student_id) {
            self.present_student_ids.retain(|s| s != student_id);
            self.updated_at = Utc::now();
        }
    }

    /// Replace the session timestamp.
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
        self.updated_at = Utc::now();
    }

    /// Replace the whole present list (not a merge).
    pub fn set_present(&mut self, present_student_ids: Vec<String>) {
        self.present_student_ids = present_student_ids;
        self.updated_at = Utc::now();
    }

    /// Number of students recorded present.
    pub fn present_count(&self) -> usize {
        self.present_student_ids.len()
    }
}

// ---------------------------------------------------------------------------
// CohortStore — Cohort Persistence
// ---------------------------------------------------------------------------

/// Cohort persistence port.
///
/// Guarantees:
/// - `save` is insert-or-replace by cohort id (last-write-wins; the store
///   adds no optimistic concurrency control).
/// - `update_rosters` replaces both id lists wholesale and fails with
///   `StorageError::CohortNotFound` for an unknown id.
/// - Lists are stored as given; duplicate prevention is the caller's
///   concern (entity set-add helpers).
#[async_trait]
pub trait CohortStore: Send + Sync {
    /// Look up a cohort by external course id.
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Cohort>>;

    /// Return every locally known cohort.
    async fn find_all(&self) -> StorageResult<Vec<Cohort>>;

    /// Insert or replace a cohort, returning the stored value.
    async fn save(&self, cohort: Cohort) -> StorageResult<Cohort>;

    /// Replace a cohort's teacher and student id lists, returning the
    /// updated cohort. Fails if the id is unknown.
    async fn update_rosters(
        &self,
        id: &str,
        teacher_ids: Vec<String>,
        student_ids: Vec<String>,
    ) -> StorageResult<Cohort>;

    /// Delete a cohort by id. No-op if absent.
    async fn delete(&self, id: &str) -> StorageResult<()>;
}

// ---------------------------------------------------------------------------
// EventStore — Attendance Event Persistence
// ---------------------------------------------------------------------------

/// Attendance event persistence port.
///
/// Guarantees:
/// - `find_by_cohort` returns events ordered by date ascending.
/// - `find_by_cohort_and_day` matches on calendar day (inclusive
///   start-of-day/end-of-day bounds), not exact timestamp equality.
/// - `update` fails with `StorageError::EventNotFound` for an unknown id;
///   `save` is insert-or-replace (last-write-wins).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Look up an event by id.
    async fn find_by_id(&self, id: &EventId) -> StorageResult<Option<AttendanceEvent>>;

    /// Return all events of a cohort, ordered by date ascending.
    /// Empty for an unknown cohort (existence checks are the caller's
    /// concern).
    async fn find_by_cohort(&self, cohort_id: &str) -> StorageResult<Vec<AttendanceEvent>>;

    /// Return the cohort's event on the same calendar day as `date`, if any.
    async fn find_by_cohort_and_day(
        &self,
        cohort_id: &str,
        date: DateTime<Utc>,
    ) -> StorageResult<Option<AttendanceEvent>>;

    /// Insert or replace an event, returning the stored value.
    async fn save(&self, event: AttendanceEvent) -> StorageResult<AttendanceEvent>;

    /// Persist a mutated event. Fails if the id is unknown.
    async fn update(&self, event: &AttendanceEvent) -> StorageResult<AttendanceEvent>;

    /// Delete an event by id. No-op if absent.
    async fn delete(&self, id: &EventId) -> StorageResult<()>;
}
