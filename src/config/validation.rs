//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every route template
//! - Check the policy's login/home/logout paths resolve to real routes
//! - Check referential integrity (course members reference known users)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system, on startup and reload

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::{Matcher, PatternError, RequestTarget, RoutePattern, RouteTable, TableMatcher};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Pattern(PatternError),

    #[error("duplicate route name `{0}`")]
    DuplicateRoute(String),

    #[error("policy field `{0}` must not be empty")]
    EmptyPolicyField(&'static str),

    #[error("no_access segment `{0}` must be a single path segment")]
    NoAccessSegment(String),

    #[error("api prefix `{0}` must start with `/`")]
    ApiPrefix(String),

    #[error("{field} `{path}` does not match any GET route")]
    UnroutedTarget { field: &'static str, path: String },

    #[error("{field} `{path}` resolves to the navigation page")]
    NavigationTarget { field: &'static str, path: String },

    #[error("duplicate course {semester}/{course}")]
    DuplicateCourse { semester: String, course: String },

    #[error("course {semester}/{course} lists unknown member `{user}`")]
    UnknownMember {
        semester: String,
        course: String,
        user: String,
    },

    #[error("duplicate user `{0}`")]
    DuplicateUser(String),
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    let mut patterns = Vec::new();
    for route in &config.routes {
        if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        match route.compile() {
            Ok(pattern) => patterns.push(pattern),
            Err(e) => errors.push(ValidationError::Pattern(e)),
        }
    }

    validate_policy(config, patterns, &mut errors);
    validate_directory(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_policy(config: &RouterConfig, patterns: Vec<RoutePattern>, errors: &mut Vec<ValidationError>) {
    let policy = &config.policy;

    let required = [
        ("auth_handler", &policy.auth_handler),
        ("home_handler", &policy.home_handler),
        ("login_path", &policy.login_path),
        ("logout_path", &policy.logout_path),
        ("home_path", &policy.home_path),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyPolicyField(field));
        }
    }

    let segment = &policy.no_access_segment;
    if segment.is_empty() || segment.contains('/') {
        errors.push(ValidationError::NoAccessSegment(segment.clone()));
    }

    if !policy.api_prefix.starts_with('/') {
        errors.push(ValidationError::ApiPrefix(policy.api_prefix.clone()));
    }

    // Redirect destinations must land on a real route that is not the navigation page.
    let matcher = TableMatcher::new(Arc::new(RouteTable::new(patterns)), policy.navigation.clone());
    let targets = [
        ("login_path", &policy.login_path),
        ("logout_path", &policy.logout_path),
        ("home_path", &policy.home_path),
    ];
    for (field, path) in targets {
        if path.trim().is_empty() {
            continue;
        }
        match matcher.match_target(&RequestTarget::get(path.as_str())) {
            None => errors.push(ValidationError::UnroutedTarget {
                field,
                path: path.clone(),
            }),
            Some(m) if m.is_navigation_handler => errors.push(ValidationError::NavigationTarget {
                field,
                path: path.clone(),
            }),
            Some(_) => {}
        }
    }
}

fn validate_directory(config: &RouterConfig, errors: &mut Vec<ValidationError>) {
    let mut users = HashSet::new();
    for user in &config.users {
        if !users.insert(user.id.as_str()) {
            errors.push(ValidationError::DuplicateUser(user.id.clone()));
        }
    }

    let mut courses = HashSet::new();
    for course in &config.courses {
        if !courses.insert((course.semester.as_str(), course.course.as_str())) {
            errors.push(ValidationError::DuplicateCourse {
                semester: course.semester.clone(),
                course: course.course.clone(),
            });
        }
        for member in &course.members {
            if !users.contains(member.as_str()) {
                errors.push(ValidationError::UnknownMember {
                    semester: course.semester.clone(),
                    course: course.course.clone(),
                    user: member.clone(),
                });
            }
        }
    }
}
