//! Google Classroom roster adapter
//!
//! Talks to the Classroom REST API (`courses`, `courses.students`,
//! `courses.teachers`) with a caller-supplied bearer token. Every failure
//! is caught here and converted to the fail-soft `None`/empty result the
//! `RosterSource` contract promises; a 404 is treated as genuine absence
//! and logged at debug, everything else as a diagnostic warning.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RosterError;
use crate::{Course, Credentials, RosterMember, RosterSource};

/// Classroom API configuration
#[derive(Debug, Clone)]
pub struct ClassroomConfig {
    /// API base URL
    pub base_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Transport-level request timeout
    pub timeout: Duration,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        ClassroomConfig {
            base_url: std::env::var("CLASSROOM_API_BASE")
                .unwrap_or_else(|_| "https://classroom.googleapis.com".to_string()),
            user_agent: "rollcall/0.1.0".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClassroomConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific API base URL
    pub fn new(base_url: &str) -> Self {
        ClassroomConfig {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Google Classroom client implementing [`RosterSource`]
#[derive(Clone)]
pub struct ClassroomClient {
    config: ClassroomConfig,
    http: reqwest::Client,
}

impl ClassroomClient {
    /// Create a new Classroom client
    pub fn new(config: ClassroomConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        ClassroomClient { config, http }
    }

    /// Create client from environment variables
    pub fn from_env() -> Self {
        Self::new(ClassroomConfig::from_env())
    }

    /// GET a JSON resource with bearer auth.
    async fn get_json<T>(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> std::result::Result<T, RosterError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .bearer_auth(&credentials.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RosterError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

// -- wire DTOs ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseDto {
    id: String,
    name: String,
    description: Option<String>,
    section: Option<String>,
    owner_id: Option<String>,
    course_state: Option<String>,
}

impl CourseDto {
    fn into_course(self) -> Course {
        Course {
            id: self.id,
            name: self.name,
            description: self.description,
            section: self.section,
            owner_id: self.owner_id,
            course_state: self.course_state,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberDto {
    user_id: String,
    profile: Option<ProfileDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDto {
    name: Option<NameDto>,
    email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameDto {
    full_name: Option<String>,
}

impl MemberDto {
    fn into_member(self) -> RosterMember {
        let (full_name, email) = match self.profile {
            Some(profile) => (
                profile.name.and_then(|n| n.full_name),
                profile.email_address,
            ),
            None => (None, None),
        };
        RosterMember {
            user_id: self.user_id,
            full_name,
            email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StudentListDto {
    students: Option<Vec<MemberDto>>,
}

#[derive(Debug, Deserialize)]
struct TeacherListDto {
    teachers: Option<Vec<MemberDto>>,
}

#[derive(Debug, Deserialize)]
struct CourseListDto {
    courses: Option<Vec<CourseDto>>,
}

#[async_trait]
impl RosterSource for ClassroomClient {
    async fn fetch_course(&self, course_id: &str, credentials: &Credentials) -> Option<Course> {
        let url = format!("{}/v1/courses/{}", self.config.base_url, course_id);

        match self.get_json::<CourseDto>(&url, credentials).await {
            Ok(dto) => Some(dto.into_course()),
            Err(err) if err.is_not_found() => {
                debug!(course_id, "course not found upstream");
                None
            }
            Err(err) => {
                warn!(course_id, error = %err, "course fetch failed");
                None
            }
        }
    }

    async fn fetch_students(
        &self,
        course_id: &str,
        credentials: &Credentials,
    ) -> Vec<RosterMember> {
        let url = format!("{}/v1/courses/{}/students", self.config.base_url, course_id);

        match self.get_json::<StudentListDto>(&url, credentials).await {
            Ok(dto) => dto
                .students
                .unwrap_or_default()
                .into_iter()
                .map(MemberDto::into_member)
                .collect(),
            Err(err) => {
                warn!(course_id, error = %err, "student roster fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch_teachers(
        &self,
        course_id: &str,
        credentials: &Credentials,
    ) -> Vec<RosterMember> {
        let url = format!("{}/v1/courses/{}/teachers", self.config.base_url, course_id);

        match self.get_json::<TeacherListDto>(&url, credentials).await {
            Ok(dto) => dto
                .teachers
                .unwrap_or_default()
                .into_iter()
                .map(MemberDto::into_member)
                .collect(),
            Err(err) => {
                warn!(course_id, error = %err, "teacher roster fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch_student(
        &self,
        course_id: &str,
        student_id: &str,
        credentials: &Credentials,
    ) -> Option<RosterMember> {
        let url = format!(
            "{}/v1/courses/{}/students/{}",
            self.config.base_url, course_id, student_id
        );

        match self.get_json::<MemberDto>(&url, credentials).await {
            Ok(dto) => Some(dto.into_member()),
            Err(err) if err.is_not_found() => {
                debug!(course_id, student_id, "student not enrolled upstream");
                None
            }
            Err(err) => {
                warn!(course_id, student_id, error = %err, "student fetch failed");
                None
            }
        }
    }

    async fn search_courses(&self, query: Option<&str>, credentials: &Credentials) -> Vec<Course> {
        let url = format!("{}/v1/courses?courseStates=ACTIVE", self.config.base_url);

        let courses = match self.get_json::<CourseListDto>(&url, credentials).await {
            Ok(dto) => dto
                .courses
                .unwrap_or_default()
                .into_iter()
                .map(CourseDto::into_course),
            Err(err) => {
                warn!(error = %err, "course search failed");
                return Vec::new();
            }
        };

        match query {
            Some(q) => {
                let needle = q.to_lowercase();
                courses
                    .filter(|c| {
                        c.name.to_lowercase().contains(&needle)
                            || c.description
                                .as_deref()
                                .map(|d| d.to_lowercase().contains(&needle))
                                .unwrap_or(false)
                    })
                    .collect()
            }
            None => courses.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_has_base_url() {
        let config = ClassroomConfig::default();
        assert!(!config.base_url.is_empty());
        assert!(!config.user_agent.is_empty());
    }

    #[test]
    fn config_new_overrides_base_url() {
        let config = ClassroomConfig::new("http://localhost:4001");
        assert_eq!(config.base_url, "http://localhost:4001");
    }

    #[test]
    fn config_builder_setters() {
        let config = ClassroomConfig::new("http://localhost:4001")
            .with_user_agent("rollcall-test/0.0.0")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.user_agent, "rollcall-test/0.0.0");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn member_dto_flattens_profile() {
        let dto = MemberDto {
            user_id: "s1".to_string(),
            profile: Some(ProfileDto {
                name: Some(NameDto {
                    full_name: Some("Sam One".to_string()),
                }),
                email_address: Some("s1@example.edu".to_string()),
            }),
        };

        let member = dto.into_member();
        assert_eq!(member.user_id, "s1");
        assert_eq!(member.full_name.as_deref(), Some("Sam One"));
        assert_eq!(member.email.as_deref(), Some("s1@example.edu"));
    }

    #[test]
    fn member_dto_tolerates_missing_profile() {
        let dto = MemberDto {
            user_id: "s1".to_string(),
            profile: None,
        };

        let member = dto.into_member();
        assert_eq!(member.user_id, "s1");
        assert!(member.full_name.is_none());
        assert!(member.email.is_none());
    }

    #[test]
    fn student_list_decodes_from_wire_shape() {
        let body = r#"{
            "students": [
                {"userId": "s1", "profile": {"name": {"fullName": "Sam One"}, "emailAddress": "s1@example.edu"}},
                {"userId": "s2"}
            ]
        }"#;

        let dto: StudentListDto = serde_json::from_str(body).unwrap();
        let students = dto.students.unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].user_id, "s1");
        assert_eq!(students[1].user_id, "s2");
    }

    #[test]
    fn empty_roster_decodes_as_none() {
        let dto: StudentListDto = serde_json::from_str("{}").unwrap();
        assert!(dto.students.is_none());
    }
}
