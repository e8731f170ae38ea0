//! Domain types and error taxonomy.
//!
//! The entities themselves (`Cohort`, `AttendanceEvent`) live beside the
//! storage ports in `rollcall-state`, and the roster-side value types
//! (`Course`, `RosterMember`, `Credentials`) beside the lookup port in
//! `rollcall-roster`; this module re-exports them next to the domain
//! error so downstream code has a single import surface.

pub mod error;

pub use error::{Result, RollcallError};

pub use rollcall_roster::{Course, Credentials, RosterMember};
pub use rollcall_state::{day_bounds, AttendanceEvent, Cohort, EventId};
