//! The per-request session collaborator consulted by the resolver.

use std::fmt;

use serde::Serialize;

use crate::error::RouterError;

/// Semester + course identifying the active dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CourseContext {
    pub semester: String,
    pub course: String,
}

impl CourseContext {
    pub fn new(semester: impl Into<String>, course: impl Into<String>) -> Self {
        Self {
            semester: semester.into(),
            course: course.into(),
        }
    }
}

impl fmt::Display for CourseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.semester, self.course)
    }
}

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub superuser: bool,
}

/// Session state for a single request.
///
/// Each request owns its own value, so implementations need no locking.
pub trait SessionContext {
    fn is_authenticated(&self) -> bool;

    /// The user loaded for this request, if any.
    fn current_user(&self) -> Option<&User>;

    /// The course context loaded for this request, if any.
    fn loaded_course(&self) -> Option<&CourseContext>;

    fn is_course_loaded(&self) -> bool {
        self.loaded_course().is_some()
    }

    /// Load the current user. Calling it again is a no-op.
    fn load_current_user(&mut self) -> Result<(), RouterError>;

    /// Load a course context.
    ///
    /// Fails with [`RouterError::ConfigLoad`] when the semester/course is unknown.
    fn load_course_context(&mut self, semester: &str, course: &str) -> Result<(), RouterError>;

    /// Whether the current user may view `course`.
    fn can_view(&self, course: &CourseContext) -> bool;
}
