//! Access-control resolution subsystem.
//!
//! # Data Flow
//! ```text
//! RequestTarget + SessionContext
//!     → Matcher (initial match or none)
//!     → web.rs  (web surface: redirecting decision chain)
//!       api.rs  (API surface: allow / deny only)
//!     → ResolvedRoute: Matched | NotFound | Unauthorized
//! ```
//!
//! # Design Decisions
//! - The surface is chosen once, when the resolver is built
//! - Exactly one terminal outcome per request; no intermediate states escape
//! - Collaborator failures propagate as `RouterError`, never as outcomes

mod api;
mod web;

use crate::config::PolicyConfig;
use crate::error::RouterError;
use crate::routing::{MatchResult, Matcher, RequestTarget};
use crate::session::SessionContext;

pub use web::OLD_PARAM;

/// Which policy a request is resolved under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Web,
    Api,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Web => "web",
            Surface::Api => "api",
        }
    }
}

/// Why a request target was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    Login,
    NoAccess,
    Home,
    Logout,
}

impl RedirectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectReason::Login => "login",
            RedirectReason::NoAccess => "no_access",
            RedirectReason::Home => "home",
            RedirectReason::Logout => "logout",
        }
    }
}

/// One substitution performed during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub reason: RedirectReason,
    pub target: RequestTarget,
}

/// A route ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The final match.
    pub route: MatchResult,
    /// The target that produced `route`; its query is what the handler sees.
    pub target: RequestTarget,
    /// Substitutions in the order they happened.
    pub redirects: Vec<Redirect>,
}

/// Terminal outcome of resolving a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRoute {
    Matched(Resolution),
    NotFound,
    Unauthorized,
}

impl ResolvedRoute {
    pub fn outcome(&self) -> &'static str {
        match self {
            ResolvedRoute::Matched(_) => "matched",
            ResolvedRoute::NotFound => "not_found",
            ResolvedRoute::Unauthorized => "unauthorized",
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            ResolvedRoute::Matched(resolution) => Some(resolution),
            _ => None,
        }
    }
}

/// Resolves request targets under one surface's policy.
#[derive(Debug)]
pub struct Resolver<'a, M: Matcher + ?Sized> {
    matcher: &'a M,
    policy: &'a PolicyConfig,
    surface: Surface,
}

impl<'a, M: Matcher + ?Sized> Resolver<'a, M> {
    pub fn new(matcher: &'a M, policy: &'a PolicyConfig, surface: Surface) -> Self {
        Self {
            matcher,
            policy,
            surface,
        }
    }

    pub fn web(matcher: &'a M, policy: &'a PolicyConfig) -> Self {
        Self::new(matcher, policy, Surface::Web)
    }

    pub fn api(matcher: &'a M, policy: &'a PolicyConfig) -> Self {
        Self::new(matcher, policy, Surface::Api)
    }

    /// Resolve `target` against the session, producing one terminal outcome.
    pub fn resolve(
        &self,
        target: RequestTarget,
        session: &mut dyn SessionContext,
    ) -> Result<ResolvedRoute, RouterError> {
        match self.surface {
            Surface::Web => web::resolve(self.matcher, self.policy, target, session),
            Surface::Api => {
                let initial = self.matcher.match_target(&target);
                Ok(api::authorize(
                    self.policy,
                    initial,
                    target,
                    session.is_authenticated(),
                ))
            }
        }
    }
}
