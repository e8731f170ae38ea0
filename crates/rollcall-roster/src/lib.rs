//! Rollcall-Roster: External Classroom Roster Access
//!
//! This crate provides the roster-lookup capability the attendance core
//! depends on: fetching a course and its student/teacher lists from the
//! external classroom-management service that owns them.
//!
//! The external service is the source of truth for membership; this crate
//! only reads. All lookups fail soft — transport problems become `None` or
//! empty results with a logged diagnostic, never errors — so callers can
//! treat "unreachable" and "absent" uniformly and decide for themselves
//! whether an absent course is fatal.
//!
//! ## Key Components
//!
//! - `RosterSource`: backend-agnostic async lookup trait
//! - `ClassroomClient`: Google Classroom REST implementation
//! - `fakes::StaticRoster`: scripted in-memory provider for tests

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod error;

pub mod classroom;
pub mod fakes;

pub use classroom::{ClassroomClient, ClassroomConfig};

/// Credential pair threaded through every call that may reach the
/// external service.
///
/// Tokens are caller-supplied per call; this crate holds no session state
/// and performs no refresh (the refresh token is carried for providers
/// that accept it alongside the access token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth access token presented as a bearer credential
    pub access_token: String,
    /// Optional refresh token; unused by lookups themselves
    pub refresh_token: Option<String>,
}

impl Credentials {
    /// Create credentials from an access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Credentials {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    /// Attach a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

/// External course profile as reported by the roster provider.
///
/// Only `id` participates in core semantics; the remaining fields are
/// carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// External course identifier
    pub id: String,
    /// Course display name
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Optional section label
    pub section: Option<String>,
    /// External id of the course owner
    pub owner_id: Option<String>,
    /// Provider-side lifecycle state (e.g. "ACTIVE")
    pub course_state: Option<String>,
}

impl Course {
    /// Create a course with just the fields the core needs.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Course {
            id: id.into(),
            name: name.into(),
            description: None,
            section: None,
            owner_id: None,
            course_state: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the provider-side lifecycle state.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.course_state = Some(state.into());
        self
    }
}

/// One course member (student or teacher) as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    /// External user identifier; the only field with core semantics
    pub user_id: String,
    /// Display name, when the provider exposes it
    pub full_name: Option<String>,
    /// Email address, when the provider exposes it
    pub email: Option<String>,
}

impl RosterMember {
    /// Create a member from its external user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        RosterMember {
            user_id: user_id.into(),
            full_name: None,
            email: None,
        }
    }

    /// Set the display name.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// External roster lookup capability.
///
/// Guarantees:
/// - Every method fails soft: transport, status, and decode failures are
///   logged inside the implementation and surface as `None` or an empty
///   list, indistinguishable from genuine absence.
/// - No method mutates provider state; the external service stays the
///   source of truth.
/// - Implementations hold no per-caller session state; credentials are
///   taken per call.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch one course by external id. `None` if absent or unreachable.
    async fn fetch_course(&self, course_id: &str, credentials: &Credentials) -> Option<Course>;

    /// Fetch the student roster of a course. Empty if absent or unreachable.
    async fn fetch_students(
        &self,
        course_id: &str,
        credentials: &Credentials,
    ) -> Vec<RosterMember>;

    /// Fetch the teacher roster of a course. Empty if absent or unreachable.
    async fn fetch_teachers(
        &self,
        course_id: &str,
        credentials: &Credentials,
    ) -> Vec<RosterMember>;

    /// Fetch one enrolled student of a course. `None` when the student is
    /// not enrolled there (or the provider is unreachable).
    async fn fetch_student(
        &self,
        course_id: &str,
        student_id: &str,
        credentials: &Credentials,
    ) -> Option<RosterMember>;

    /// List the caller's active courses, optionally filtered by a
    /// name/description substring. Used for course discovery, never by
    /// the sync path.
    async fn search_courses(&self, query: Option<&str>, credentials: &Credentials) -> Vec<Course>;
}
