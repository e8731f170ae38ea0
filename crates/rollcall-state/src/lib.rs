//! Rollcall-State: SurrealDB Persistence for Rollcall
//!
//! This crate provides the persistence layer for the cohort-attendance
//! system. It owns the domain records (cohorts mirrored from an external
//! classroom service, dated attendance events) and the storage ports the
//! core orchestrates against.
//!
//! ## Key Components
//!
//! - `CohortStore` / `EventStore`: backend-agnostic async storage traits
//! - `SurrealStore`: SurrealDB implementation of both traits
//! - `fakes`: in-memory implementations for tests
//! - `Cohort` / `AttendanceEvent`: the persisted domain records

mod error;
pub mod fakes;
mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal;

pub use error::{StateError, StorageError};
pub use storage_traits::{
    day_bounds, AttendanceEvent, Cohort, CohortStore, EventId, EventStore, StorageResult,
};
pub use surreal::{DbConfig, SurrealStore};

/// Result type for rollcall-state operations
pub type Result<T> = std::result::Result<T, StateError>;
