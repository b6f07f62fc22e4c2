//! Route pattern compilation.
//!
//! # Responsibilities
//! - Parse `handler::method` references
//! - Compile path templates (`/{_semester}/{_course}/gradeable/{id}`) into segments
//! - Capture named parameters from a concrete path
//!
//! # Design Decisions
//! - A `{name}` segment captures exactly one non-empty path segment
//! - Literal segments are case-sensitive
//! - Empty segments are ignored on both sides, so `/home/` equals `/home`
//! - No regex: matching is a single pass over the segments

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Params;

/// Errors produced while compiling route declarations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid handler reference `{0}`, expected `handler::method`")]
    HandlerKey(String),

    #[error("route `{route}`: template `{template}` must start with `/`")]
    MissingLeadingSlash { route: String, template: String },

    #[error("route `{route}`: malformed segment `{segment}`")]
    MalformedSegment { route: String, segment: String },

    #[error("route `{route}`: parameter `{name}` declared twice")]
    DuplicateParam { route: String, name: String },

    #[error("route `{route}`: invalid HTTP method `{method}`")]
    Method { route: String, method: String },
}

/// Identifies a handler: the controller name plus the method to call on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HandlerKey {
    pub handler: String,
    pub method: String,
}

impl HandlerKey {
    pub fn new(handler: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.handler, self.method)
    }
}

impl FromStr for HandlerKey {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("::") {
            Some((handler, method))
                if !handler.is_empty() && !method.is_empty() && !method.contains("::") =>
            {
                Ok(Self::new(handler, method))
            }
            _ => Err(PatternError::HandlerKey(s.to_string())),
        }
    }
}

impl TryFrom<String> for HandlerKey {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HandlerKey> for String {
    fn from(key: HandlerKey) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route: method + template bound to a handler.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    name: String,
    method: Method,
    template: String,
    handler: HandlerKey,
    segments: Vec<Segment>,
    params: Vec<String>,
}

impl RoutePattern {
    /// Compile a route declaration.
    pub fn new(
        name: impl Into<String>,
        method: &str,
        template: impl Into<String>,
        handler: HandlerKey,
    ) -> Result<Self, PatternError> {
        let name = name.into();
        let template = template.into();

        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
            PatternError::Method {
                route: name.clone(),
                method: method.to_string(),
            }
        })?;

        if !template.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash {
                route: name,
                template,
            });
        }

        let mut segments = Vec::new();
        let mut params: Vec<String> = Vec::new();
        for raw in template.split('/').filter(|s| !s.is_empty()) {
            let segment = parse_segment(raw).ok_or_else(|| PatternError::MalformedSegment {
                route: name.clone(),
                segment: raw.to_string(),
            })?;
            if let Segment::Param(param) = &segment {
                if params.contains(param) {
                    return Err(PatternError::DuplicateParam {
                        route: name,
                        name: param.clone(),
                    });
                }
                params.push(param.clone());
            }
            segments.push(segment);
        }

        Ok(Self {
            name,
            method,
            template,
            handler,
            segments,
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn handler(&self) -> &HandlerKey {
        &self.handler
    }

    /// Declared parameter names, in template order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// HEAD is served by GET routes.
    pub fn accepts(&self, method: &Method) -> bool {
        self.method == method || (self.method == Method::GET && method == Method::HEAD)
    }

    /// Capture path parameters if `path` fits this template.
    /// `path` must already be stripped of its query string. Captured values
    /// are percent-decoded.
    pub fn capture(&self, path: &str) -> Option<Params> {
        let mut parts = path.split('/').filter(|s| !s.is_empty());
        let mut captured = Params::new();

        for segment in &self.segments {
            // Segments are compared and captured decoded; invalid UTF-8 never matches.
            let part = percent_decode_str(parts.next()?).decode_utf8().ok()?;
            match segment {
                Segment::Literal(literal) if *literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    captured.insert(name.clone(), part.into_owned());
                }
            }
        }

        // Trailing segments mean the path is longer than the template.
        if parts.next().is_some() {
            return None;
        }
        Some(captured)
    }
}

fn parse_segment(raw: &str) -> Option<Segment> {
    match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(name) => {
            let valid = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            valid.then(|| Segment::Param(name.to_string()))
        }
        None if raw.contains('{') || raw.contains('}') => None,
        None => Some(Segment::Literal(raw.to_string())),
    }
}
