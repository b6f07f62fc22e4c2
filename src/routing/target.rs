//! Request targets and match results.

use std::fmt;

use axum::http::{Method, Uri};

use super::{HandlerKey, Params};

/// Path parameter carrying the semester of a course route.
pub const SEMESTER_PARAM: &str = "_semester";
/// Path parameter carrying the course of a course route.
pub const COURSE_PARAM: &str = "_course";
/// Synthetic parameter naming the matched controller.
pub const CONTROLLER_PARAM: &str = "_controller";
/// Synthetic parameter naming the matched method.
pub const METHOD_PARAM: &str = "_method";
/// Synthetic parameter naming the matched route.
pub const ROUTE_PARAM: &str = "_route";
/// Parameters starting with this prefix are routing metadata.
pub const SYNTHETIC_PREFIX: char = '_';

/// What a request asks for: method, path and query parameters.
///
/// Substitutions build a new target instead of editing an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub method: Method,
    pub path: String,
    pub query: Params,
}

impl RequestTarget {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Params::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Build a target from an incoming request line.
    /// Repeated query keys keep the last value.
    pub fn from_uri(method: Method, uri: &Uri) -> Self {
        let query = uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self {
            method,
            path: uri.path().to_string(),
            query,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// The path without any trailing `?query`.
    pub fn path_only(&self) -> &str {
        self.path.split('?').next().unwrap_or_default()
    }

    /// `path?key=value`, with query values rendered verbatim.
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path_only(), query)
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri())
    }
}

/// A successful route match.
///
/// `path_params` holds the captured template parameters plus the synthetic
/// `_controller`, `_method` and `_route` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub route: String,
    pub handler: HandlerKey,
    pub path_params: Params,
    pub is_navigation_handler: bool,
}

impl MatchResult {
    pub fn handler_id(&self) -> &str {
        &self.handler.handler
    }

    pub fn method_name(&self) -> &str {
        &self.handler.method
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// `(semester, course)` when the route carries both course segments.
    pub fn course_segments(&self) -> Option<(&str, &str)> {
        Some((self.param(SEMESTER_PARAM)?, self.param(COURSE_PARAM)?))
    }
}
