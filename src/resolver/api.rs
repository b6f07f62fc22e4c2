//! API policy: allow or deny, never redirect.

use crate::config::PolicyConfig;
use crate::routing::{MatchResult, RequestTarget};

use super::{Resolution, ResolvedRoute};

/// Decide the outcome of an API request from its match and authentication.
pub(crate) fn authorize(
    policy: &PolicyConfig,
    initial: Option<MatchResult>,
    target: RequestTarget,
    authenticated: bool,
) -> ResolvedRoute {
    let route = match initial {
        Some(route) if route.is_navigation_handler => {
            // The navigation page is web-only; `/api/x` must not land on `/{_semester}/{_course}`.
            tracing::debug!(target = %target, "API request matched the navigation page");
            return ResolvedRoute::NotFound;
        }
        Some(route) => route,
        None => return ResolvedRoute::NotFound,
    };

    if !authenticated && route.handler_id() != policy.auth_handler {
        return ResolvedRoute::Unauthorized;
    }

    ResolvedRoute::Matched(Resolution {
        route,
        target,
        redirects: Vec::new(),
    })
}
