//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::{HandlerKey, PatternError, RoutePattern};

/// Root configuration for the course router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Special routes and handlers the access policy redirects between.
    pub policy: PolicyConfig,

    /// Inline route declarations, highest precedence first.
    pub routes: Vec<RouteConfig>,

    /// Directory of additional route files, loaded after inline routes.
    pub routes_dir: Option<PathBuf>,

    /// Known course contexts.
    pub courses: Vec<CourseConfig>,

    /// Known users.
    pub users: Vec<UserConfig>,

    /// Session store settings.
    pub sessions: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            policy: PolicyConfig::default(),
            routes: default_routes(),
            routes_dir: None,
            courses: Vec::new(),
            users: Vec::new(),
            sessions: SessionConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for resolution and dispatch) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Identities and targets used by the access policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Controller that may always be reached, logged in or not.
    pub auth_handler: String,

    /// Controller serving the home page.
    pub home_handler: String,

    /// Handler that ends a session.
    pub logout: HandlerKey,

    /// Handler serving the course navigation page. Web-only and never a
    /// redirect destination.
    pub navigation: HandlerKey,

    pub login_path: String,
    pub logout_path: String,
    pub home_path: String,

    /// Last segment of `/{semester}/{course}/<segment>`.
    pub no_access_segment: String,

    /// Requests under this prefix use the API policy.
    pub api_prefix: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            auth_handler: "authentication".to_string(),
            home_handler: "home".to_string(),
            logout: HandlerKey::new("authentication", "logout"),
            navigation: HandlerKey::new("navigation", "show"),
            login_path: "/authentication/login".to_string(),
            logout_path: "/authentication/logout".to_string(),
            home_path: "/home".to_string(),
            no_access_segment: "no_access".to_string(),
            api_prefix: "/api".to_string(),
        }
    }
}

impl PolicyConfig {
    /// `/{semester}/{course}/no_access`
    pub fn no_access_path(&self, semester: &str, course: &str) -> String {
        format!("/{}/{}/{}", semester, course, self.no_access_segment)
    }

    pub fn is_api_path(&self, path: &str) -> bool {
        let prefix = self.api_prefix.trim_end_matches('/');
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// A route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Path template, e.g. `/{_semester}/{_course}/gradeable/{gradeable_id}`.
    pub path: String,

    /// Handler reference, written `handler::method`.
    pub handler: HandlerKey,
}

fn default_method() -> String {
    "GET".to_string()
}

impl RouteConfig {
    pub fn new(name: &str, method: &str, path: &str, handler: HandlerKey) -> Self {
        Self {
            name: name.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            handler,
        }
    }

    pub fn compile(&self) -> Result<RoutePattern, PatternError> {
        RoutePattern::new(&self.name, &self.method, &self.path, self.handler.clone())
    }
}

/// Contents of a file under `routes_dir`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteFile {
    pub routes: Vec<RouteConfig>,
}

/// A course context that may be loaded.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CourseConfig {
    pub semester: String,
    pub course: String,

    /// Users allowed to view the course.
    #[serde(default)]
    pub members: Vec<String>,
}

/// A known user.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Superusers may view every course.
    #[serde(default)]
    pub superuser: bool,
}

/// Session store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle seconds before a session expires.
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 8 * 60 * 60,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Routes served by the built-in handlers.
///
/// Course-specific routes come before `/{_semester}/{_course}` so the
/// navigation page only catches bare course URLs.
pub fn default_routes() -> Vec<RouteConfig> {
    let key = HandlerKey::new;
    vec![
        RouteConfig::new("login", "GET", "/authentication/login", key("authentication", "login_form")),
        RouteConfig::new("check_login", "POST", "/authentication/check_login", key("authentication", "check_login")),
        RouteConfig::new("logout", "GET", "/authentication/logout", key("authentication", "logout")),
        RouteConfig::new("home", "GET", "/home", key("home", "show")),
        RouteConfig::new("api_token", "POST", "/api/token", key("authentication", "check_login")),
        RouteConfig::new("api_courses", "GET", "/api/courses", key("home", "courses")),
        RouteConfig::new("no_access", "GET", "/{_semester}/{_course}/no_access", key("course", "no_access")),
        RouteConfig::new("gradeable", "GET", "/{_semester}/{_course}/gradeable/{gradeable_id}", key("course", "gradeable")),
        RouteConfig::new("navigation", "GET", "/{_semester}/{_course}", key("navigation", "show")),
    ]
}
