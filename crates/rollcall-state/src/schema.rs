//! Schema definitions for rollcall SurrealDB tables
//!
//! Tables:
//! - cohorts: local mirrors of external courses (roster copies)
//! - attendance_events: dated class sessions with present-student sets
//!
//! Rows carry the SurrealDB record id and datetime-typed timestamps;
//! conversions to and from the domain types live on the rows so the
//! adapter stays thin.

use chrono::{DateTime, Utc};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

use serde::{Deserialize, Serialize};

use crate::storage_traits::{AttendanceEvent, Cohort, EventId};

/// Cohort row stored in SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortRow {
    /// SurrealDB record ID
    pub id: Option<surrealdb::sql::Thing>,
    /// External course identifier (unique)
    pub cohort_id: String,
    /// Aggregate attendance target
    pub attendance_quota_total: u32,
    /// Aggregate class-count target
    pub class_count_total: u32,
    /// External teacher user ids
    pub teacher_ids: Vec<String>,
    /// External student user ids
    pub student_ids: Vec<String>,
    /// First-sync timestamp
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    /// Last roster mutation timestamp
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl CohortRow {
    /// Build a row from a domain cohort (record id unset).
    pub fn from_domain(cohort: &Cohort) -> Self {
        CohortRow {
            id: None,
            cohort_id: cohort.id.clone(),
            attendance_quota_total: cohort.attendance_quota_total,
            class_count_total: cohort.class_count_total,
            teacher_ids: cohort.teacher_ids.clone(),
            student_ids: cohort.student_ids.clone(),
            created_at: cohort.created_at,
            updated_at: cohort.updated_at,
        }
    }

    /// Convert a fetched row back into the domain cohort.
    pub fn into_domain(self) -> Cohort {
        Cohort {
            id: self.cohort_id,
            attendance_quota_total: self.attendance_quota_total,
            class_count_total: self.class_count_total,
            teacher_ids: self.teacher_ids,
            student_ids: self.student_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Replace both roster lists, advancing `updated_at`.
    pub fn with_rosters(mut self, teacher_ids: Vec<String>, student_ids: Vec<String>) -> Self {
        self.teacher_ids = teacher_ids;
        self.student_ids = student_ids;
        self.updated_at = Utc::now();
        self
    }
}

/// Attendance event row stored in SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRow {
    /// SurrealDB record ID
    pub id: Option<surrealdb::sql::Thing>,
    /// Locally generated event id (unique)
    pub event_id: String,
    /// Owning cohort (external course id)
    pub cohort_id: String,
    /// Session timestamp
    #[serde(with = "surreal_datetime")]
    pub date: DateTime<Utc>,
    /// External student ids recorded present
    pub present_student_ids: Vec<String>,
    /// Creation timestamp
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl EventRow {
    /// Build a row from a domain event (record id unset).
    pub fn from_domain(event: &AttendanceEvent) -> Self {
        EventRow {
            id: None,
            event_id: event.id.0.clone(),
            cohort_id: event.cohort_id.clone(),
            date: event.date,
            present_student_ids: event.present_student_ids.clone(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }

    /// Convert a fetched row back into the domain event.
    pub fn into_domain(self) -> AttendanceEvent {
        AttendanceEvent {
            id: EventId(self.event_id),
            cohort_id: self.cohort_id,
            date: self.date,
            present_student_ids: self.present_student_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
