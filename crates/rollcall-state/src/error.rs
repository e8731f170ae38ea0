//! Error types for rollcall-state

use thiserror::Error;

/// Errors that can occur in the state persistence layer
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        StateError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}

/// Errors surfaced by the storage ports (`CohortStore`, `EventStore`)
#[derive(Error, Debug)]
pub enum StorageError {
    /// Cohort id is unknown to the store
    #[error("Cohort not found: {cohort_id}")]
    CohortNotFound { cohort_id: String },

    /// Attendance event id is unknown to the store
    #[error("Attendance event not found: {event_id}")]
    EventNotFound { event_id: String },

    /// Backend failure (connection, query, decode) with no domain meaning
    #[error("Storage backend error: {0}")]
    Backend(String),
}
