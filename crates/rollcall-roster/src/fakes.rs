//! Scriptable in-memory roster for tests
//!
//! `StaticRoster` serves whatever courses and rosters a test scripts into
//! it, and can be flipped "offline" to exercise the fail-soft paths of
//! callers without a real Classroom backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{Course, Credentials, RosterMember, RosterSource};

#[derive(Debug, Default)]
struct RosterState {
    courses: HashMap<String, Course>,
    students: HashMap<String, Vec<RosterMember>>,
    teachers: HashMap<String, Vec<RosterMember>>,
    offline: bool,
}

/// In-memory [`RosterSource`] with scriptable contents
#[derive(Debug, Default, Clone)]
pub struct StaticRoster {
    state: Arc<Mutex<RosterState>>,
}

impl StaticRoster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a course
    pub fn add_course(&self, course: Course) {
        let mut state = self.state.lock().unwrap();
        state.courses.insert(course.id.clone(), course);
    }

    /// Replace the student roster of a course
    pub fn set_students(&self, course_id: &str, students: Vec<RosterMember>) {
        let mut state = self.state.lock().unwrap();
        state.students.insert(course_id.to_string(), students);
    }

    /// Replace the teacher roster of a course
    pub fn set_teachers(&self, course_id: &str, teachers: Vec<RosterMember>) {
        let mut state = self.state.lock().unwrap();
        state.teachers.insert(course_id.to_string(), teachers);
    }

    /// Add a single student to a course roster, e.g. to simulate a
    /// late enrollment after callers have already synced.
    pub fn enroll_student(&self, course_id: &str, member: RosterMember) {
        let mut state = self.state.lock().unwrap();
        state
            .students
            .entry(course_id.to_string())
            .or_default()
            .push(member);
    }

    /// Toggle outage mode; while offline every lookup comes back empty.
    pub fn set_offline(&self, offline: bool) {
        let mut state = self.state.lock().unwrap();
        state.offline = offline;
    }
}

#[async_trait]
impl RosterSource for StaticRoster {
    async fn fetch_course(&self, course_id: &str, _credentials: &Credentials) -> Option<Course> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return None;
        }
        state.courses.get(course_id).cloned()
    }

    async fn fetch_students(
        &self,
        course_id: &str,
        _credentials: &Credentials,
    ) -> Vec<RosterMember> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Vec::new();
        }
        state.students.get(course_id).cloned().unwrap_or_default()
    }

    async fn fetch_teachers(
        &self,
        course_id: &str,
        _credentials: &Credentials,
    ) -> Vec<RosterMember> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Vec::new();
        }
        state.teachers.get(course_id).cloned().unwrap_or_default()
    }

    async fn fetch_student(
        &self,
        course_id: &str,
        student_id: &str,
        _credentials: &Credentials,
    ) -> Option<RosterMember> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return None;
        }
        state
            .students
            .get(course_id)?
            .iter()
            .find(|m| m.user_id == student_id)
            .cloned()
    }

    async fn search_courses(&self, query: Option<&str>, _credentials: &Credentials) -> Vec<Course> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Vec::new();
        }

        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| match query {
                Some(q) => {
                    let needle = q.to_lowercase();
                    c.name.to_lowercase().contains(&needle)
                        || c.description
                            .as_deref()
                            .map(|d| d.to_lowercase().contains(&needle))
                            .unwrap_or(false)
                }
                None => true,
            })
            .cloned()
            .collect();

        courses.sort_by(|a, b| a.id.cmp(&b.id));
        courses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("test-token")
    }

    #[tokio::test]
    async fn serves_scripted_course_and_rosters() {
        let roster = StaticRoster::new();
        roster.add_course(Course::new("CS101", "Intro to Programming"));
        roster.set_students(
            "CS101",
            vec![RosterMember::new("s1"), RosterMember::new("s2")],
        );
        roster.set_teachers("CS101", vec![RosterMember::new("t1")]);

        let course = roster.fetch_course("CS101", &creds()).await.unwrap();
        assert_eq!(course.name, "Intro to Programming");

        let students = roster.fetch_students("CS101", &creds()).await;
        assert_eq!(students.len(), 2);

        let teachers = roster.fetch_teachers("CS101", &creds()).await;
        assert_eq!(teachers.len(), 1);
    }

    #[tokio::test]
    async fn unknown_course_is_none_and_empty() {
        let roster = StaticRoster::new();

        assert!(roster.fetch_course("nope", &creds()).await.is_none());
        assert!(roster.fetch_students("nope", &creds()).await.is_empty());
        assert!(roster.fetch_teachers("nope", &creds()).await.is_empty());
    }

    #[tokio::test]
    async fn fetch_student_finds_enrolled_member_only() {
        let roster = StaticRoster::new();
        roster.set_students("CS101", vec![RosterMember::new("s1")]);

        assert!(roster.fetch_student("CS101", "s1", &creds()).await.is_some());
        assert!(roster.fetch_student("CS101", "s9", &creds()).await.is_none());
    }

    #[tokio::test]
    async fn late_enrollment_shows_up_in_later_fetches() {
        let roster = StaticRoster::new();
        roster.set_students("CS101", vec![RosterMember::new("s1")]);

        assert!(roster.fetch_student("CS101", "s2", &creds()).await.is_none());

        roster.enroll_student("CS101", RosterMember::new("s2"));

        assert!(roster.fetch_student("CS101", "s2", &creds()).await.is_some());
        assert_eq!(roster.fetch_students("CS101", &creds()).await.len(), 2);
    }

    #[tokio::test]
    async fn offline_mode_empties_every_lookup() {
        let roster = StaticRoster::new();
        roster.add_course(Course::new("CS101", "Intro to Programming"));
        roster.set_students("CS101", vec![RosterMember::new("s1")]);
        roster.set_offline(true);

        assert!(roster.fetch_course("CS101", &creds()).await.is_none());
        assert!(roster.fetch_students("CS101", &creds()).await.is_empty());
        assert!(roster.fetch_student("CS101", "s1", &creds()).await.is_none());
        assert!(roster.search_courses(None, &creds()).await.is_empty());

        roster.set_offline(false);
        assert!(roster.fetch_course("CS101", &creds()).await.is_some());
    }

    #[tokio::test]
    async fn search_filters_on_name_and_description() {
        let roster = StaticRoster::new();
        roster.add_course(Course::new("CS101", "Intro to Programming"));
        roster.add_course(
            Course::new("MA201", "Linear Algebra").with_description("matrices and programming"),
        );
        roster.add_course(Course::new("HI301", "World History"));

        let all = roster.search_courses(None, &creds()).await;
        assert_eq!(all.len(), 3);

        let hits = roster.search_courses(Some("programming"), &creds()).await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "CS101");
        assert_eq!(hits[1].id, "MA201");

        let none = roster.search_courses(Some("chemistry"), &creds()).await;
        assert!(none.is_empty());
    }
}
