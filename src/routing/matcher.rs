//! Route matching logic.
//!
//! # Responsibilities
//! - Match method + path of a request target against the route table
//! - Extract path parameters and attach synthetic routing metadata
//! - Flag matches that land on the navigation-page handler
//!
//! # Design Decisions
//! - Pure: no side effects, same input always yields the same match
//! - First match wins, in declaration order
//! - The query string never takes part in matching
//! - No match is an ordinary outcome (`None`), not an error

use std::sync::Arc;

use super::target::{CONTROLLER_PARAM, METHOD_PARAM, ROUTE_PARAM};
use super::{HandlerKey, MatchResult, RequestTarget, RouteTable};

/// Trait for resolving request targets to routes.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the first route matching `target`, if any.
    fn match_target(&self, target: &RequestTarget) -> Option<MatchResult>;
}

/// Matches against a compiled [`RouteTable`].
#[derive(Debug, Clone)]
pub struct TableMatcher {
    table: Arc<RouteTable>,
    navigation: HandlerKey,
}

impl TableMatcher {
    /// `navigation` is the handler reserved for the course navigation page.
    pub fn new(table: Arc<RouteTable>, navigation: HandlerKey) -> Self {
        Self { table, navigation }
    }
}

impl Matcher for TableMatcher {
    fn match_target(&self, target: &RequestTarget) -> Option<MatchResult> {
        let path = target.path_only();
        self.table
            .iter()
            .filter(|route| route.accepts(&target.method))
            .find_map(|route| {
                let mut path_params = route.capture(path)?;
                let handler = route.handler().clone();
                path_params.insert(CONTROLLER_PARAM.to_string(), handler.handler.clone());
                path_params.insert(METHOD_PARAM.to_string(), handler.method.clone());
                path_params.insert(ROUTE_PARAM.to_string(), route.name().to_string());

                Some(MatchResult {
                    route: route.name().to_string(),
                    is_navigation_handler: handler == self.navigation,
                    handler,
                    path_params,
                })
            })
    }
}
