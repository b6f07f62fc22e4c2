//! In-memory session store and the session context built on it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::config::{CourseConfig, UserConfig};
use crate::error::RouterError;

use super::context::{CourseContext, SessionContext, User};

/// Idle time after which a session expires.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(8 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry {
    user_id: String,
    last_seen: Instant,
}

/// Thread-safe map of session id -> user id.
///
/// Sessions expire after sitting idle for the store's timeout. Lookups refresh
/// the timeout; expired entries are dropped on lookup and whenever a new
/// session is created.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Entry>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            idle_timeout,
        }
    }

    /// Start a session for `user_id` and return its id.
    pub fn create(&self, user_id: &str) -> String {
        self.purge_expired();
        let session_id = Uuid::new_v4().to_string();
        self.inner.insert(
            session_id.clone(),
            Entry {
                user_id: user_id.to_string(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(user = %user_id, "Session created");
        session_id
    }

    pub fn user_for(&self, session_id: &str) -> Option<String> {
        let mut entry = self.inner.get_mut(session_id)?;
        if entry.last_seen.elapsed() >= self.idle_timeout {
            drop(entry);
            self.inner.remove(session_id);
            tracing::debug!("Session expired");
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.user_id.clone())
    }

    /// End a session. Returns false if it did not exist.
    pub fn remove(&self, session_id: &str) -> bool {
        self.inner.remove(session_id).is_some()
    }

    /// Drop every session idle for longer than the timeout.
    pub fn purge_expired(&self) -> usize {
        let before = self.inner.len();
        self.inner
            .retain(|_, entry| entry.last_seen.elapsed() < self.idle_timeout);
        before.saturating_sub(self.inner.len())
    }

    pub fn count(&self) -> usize {
        self.inner.len()
    }
}

/// Known users and courses, built from configuration.
#[derive(Debug, Default)]
pub struct Directory {
    users: HashMap<String, User>,
    courses: BTreeMap<CourseContext, HashSet<String>>,
}

impl Directory {
    pub fn from_config(users: &[UserConfig], courses: &[CourseConfig]) -> Self {
        let users = users
            .iter()
            .map(|u| {
                let user = User {
                    id: u.id.clone(),
                    name: if u.name.is_empty() { u.id.clone() } else { u.name.clone() },
                    superuser: u.superuser,
                };
                (u.id.clone(), user)
            })
            .collect();
        let courses = courses
            .iter()
            .map(|c| {
                (
                    CourseContext::new(&c.semester, &c.course),
                    c.members.iter().cloned().collect(),
                )
            })
            .collect();
        Self { users, courses }
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn has_course(&self, course: &CourseContext) -> bool {
        self.courses.contains_key(course)
    }

    pub fn is_member(&self, course: &CourseContext, user_id: &str) -> bool {
        self.courses
            .get(course)
            .is_some_and(|members| members.contains(user_id))
    }

    pub fn courses(&self) -> impl Iterator<Item = &CourseContext> {
        self.courses.keys()
    }
}

/// [`SessionContext`] for one request, backed by a [`SessionStore`] and a [`Directory`].
///
/// The user is loaded eagerly when the session's user is known to the
/// directory; an authenticated session whose user is missing stays unloaded.
#[derive(Debug)]
pub struct StoreSession {
    directory: Arc<Directory>,
    user_id: Option<String>,
    user: Option<User>,
    course: Option<CourseContext>,
}

impl StoreSession {
    pub fn open(store: &SessionStore, directory: Arc<Directory>, session_id: Option<&str>) -> Self {
        let user_id = session_id.and_then(|id| store.user_for(id));
        let user = user_id
            .as_deref()
            .and_then(|id| directory.user(id))
            .cloned();
        Self {
            directory,
            user_id,
            user,
            course: None,
        }
    }
}

impl SessionContext for StoreSession {
    fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn loaded_course(&self) -> Option<&CourseContext> {
        self.course.as_ref()
    }

    fn load_current_user(&mut self) -> Result<(), RouterError> {
        if self.user.is_some() {
            return Ok(());
        }
        if let Some(id) = &self.user_id {
            self.user = self.directory.user(id).cloned();
            if self.user.is_none() {
                tracing::debug!(user = %id, "Session user not present in directory");
            }
        }
        Ok(())
    }

    fn load_course_context(&mut self, semester: &str, course: &str) -> Result<(), RouterError> {
        let context = CourseContext::new(semester, course);
        if !self.directory.has_course(&context) {
            return Err(RouterError::ConfigLoad {
                semester: semester.to_string(),
                course: course.to_string(),
            });
        }
        self.course = Some(context);
        Ok(())
    }

    fn can_view(&self, course: &CourseContext) -> bool {
        match &self.user {
            Some(user) => user.superuser || self.directory.is_member(course, &user.id),
            None => false,
        }
    }
}
