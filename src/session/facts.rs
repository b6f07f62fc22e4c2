//! Immutable snapshots of session state.

use super::context::{CourseContext, SessionContext};

/// What the resolver knows about the session at one point in the chain.
///
/// Snapshots are taken only at declared points: after the course context is
/// loaded and after the current user is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFacts {
    pub authenticated: bool,
    pub user_loaded: bool,
    pub course_loaded: bool,
    pub semester: Option<String>,
    pub course: Option<String>,
}

impl SessionFacts {
    pub fn read(session: &dyn SessionContext) -> Self {
        let loaded = session.loaded_course();
        Self {
            authenticated: session.is_authenticated(),
            user_loaded: session.current_user().is_some(),
            course_loaded: session.is_course_loaded(),
            semester: loaded.map(|c| c.semester.clone()),
            course: loaded.map(|c| c.course.clone()),
        }
    }

    pub fn course_context(&self) -> Option<CourseContext> {
        match (&self.semester, &self.course) {
            (Some(semester), Some(course)) => Some(CourseContext::new(semester, course)),
            _ => None,
        }
    }
}
