//! Domain-level error taxonomy for rollcall.

use chrono::NaiveDate;
use rollcall_state::StorageError;

/// Rollcall domain errors.
///
/// Roster-source outages are deliberately absent: transport failures are
/// downgraded to empty lookups at the roster boundary, and only surface
/// here as `CohortNotFound` / `InvalidMember` when the caller needed the
/// missing answer.
#[derive(Debug, thiserror::Error)]
pub enum RollcallError {
    /// Unknown locally and, where syncing was permitted, unobtainable
    /// upstream as well.
    #[error("cohort not found: {0}")]
    CohortNotFound(String),

    #[error("attendance event not found: {0}")]
    EventNotFound(String),

    /// An event already exists for this cohort on the same calendar day.
    #[error("attendance already recorded for cohort {cohort_id} on {date}")]
    DuplicateEvent { cohort_id: String, date: NaiveDate },

    /// The student is absent from the external roster too; nothing to heal.
    #[error("student {student_id} is not a member of cohort {cohort_id}")]
    InvalidMember {
        cohort_id: String,
        student_id: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for rollcall domain operations.
pub type Result<T> = std::result::Result<T, RollcallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RollcallError::CohortNotFound("CS101".to_string());
        assert!(err.to_string().contains("cohort not found"));
        assert!(err.to_string().contains("CS101"));

        let err = RollcallError::EventNotFound("evt-1".to_string());
        assert!(err.to_string().contains("attendance event not found"));
    }

    #[test]
    fn test_duplicate_event_names_day() {
        let err = RollcallError::DuplicateEvent {
            cohort_id: "CS101".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("CS101"));
        assert!(msg.contains("2024-03-01"));
    }

    #[test]
    fn test_invalid_member_names_both_ids() {
        let err = RollcallError::InvalidMember {
            cohort_id: "CS101".to_string(),
            student_id: "s9".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("s9"));
        assert!(msg.contains("CS101"));
    }

    #[test]
    fn test_storage_error_converts() {
        let err: RollcallError = StorageError::Backend("connection reset".to_string()).into();
        assert!(matches!(err, RollcallError::Storage(_)));
        assert!(err.to_string().contains("connection reset"));
    }
}
