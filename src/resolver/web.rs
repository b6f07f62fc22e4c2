//! Web policy: the redirecting authorization chain.
//!
//! # Decision Chain
//! ```text
//! initial match (or none)
//!     → course route? load course context          (errors propagate)
//!     → authorization, first hit wins:
//!         a. anonymous, not auth handler            → login page (?old=<path>)
//!         b. signed in, no user → load user; not auth handler → no_access
//!         c. course loaded, cannot view, not auth   → no_access
//!     → course fallback when no course is loaded:
//!         signed in + logout handler                → logout page
//!         signed in + not home handler              → home page
//!         anonymous + not auth handler              → login page
//!     → final match, NotFound otherwise
//! ```
//!
//! # Design Decisions
//! - Every substitution is re-matched exactly once; the new match is never fed
//!   back into the stage that produced it, so resolution always terminates
//! - The fallback stage runs after the authorization stage even when that
//!   stage already substituted, so a request can be redirected twice at most
//! - A substitute that matches nothing, or lands on the navigation page,
//!   ends resolution with NotFound

use crate::config::PolicyConfig;
use crate::error::RouterError;
use crate::observability::metrics;
use crate::routing::{MatchResult, Matcher, RequestTarget};
use crate::session::{SessionContext, SessionFacts};

use super::{Redirect, RedirectReason, Resolution, ResolvedRoute};

/// Query parameter carrying the originally requested path to the login page.
pub const OLD_PARAM: &str = "old";

/// Where the chain currently stands.
#[derive(Debug)]
enum Current {
    /// The original request matched nothing; the chain still runs.
    Unresolved,
    Matched(MatchResult),
    /// A substitute matched nothing usable. Terminal.
    Missing,
}

struct WebFlow<'a, M: Matcher + ?Sized> {
    matcher: &'a M,
    policy: &'a PolicyConfig,
    original: RequestTarget,
    target: RequestTarget,
    current: Current,
    redirects: Vec<Redirect>,
}

/// Run the web policy for `target`.
pub(crate) fn resolve<M: Matcher + ?Sized>(
    matcher: &M,
    policy: &PolicyConfig,
    target: RequestTarget,
    session: &mut dyn SessionContext,
) -> Result<ResolvedRoute, RouterError> {
    let current = match matcher.match_target(&target) {
        Some(m) => Current::Matched(m),
        None => Current::Unresolved,
    };
    tracing::debug!(target = %target, matched = !matches!(current, Current::Unresolved), "Web resolution started");

    let mut flow = WebFlow {
        matcher,
        policy,
        original: target.clone(),
        target,
        current,
        redirects: Vec::new(),
    };

    flow.load_course(session)?;
    flow.authorize(session)?;
    if !matches!(flow.current, Current::Missing) {
        flow.course_fallback(&SessionFacts::read(session));
    }
    Ok(flow.finish())
}

impl<'a, M: Matcher + ?Sized> WebFlow<'a, M> {
    fn matched(&self) -> Option<&MatchResult> {
        match &self.current {
            Current::Matched(m) => Some(m),
            _ => None,
        }
    }

    fn is_auth_handler(&self) -> bool {
        self.matched()
            .is_some_and(|m| m.handler_id() == self.policy.auth_handler)
    }

    fn is_home_handler(&self) -> bool {
        self.matched()
            .is_some_and(|m| m.handler_id() == self.policy.home_handler)
    }

    fn is_logout_handler(&self) -> bool {
        self.matched().is_some_and(|m| m.handler == self.policy.logout)
    }

    fn load_course(&self, session: &mut dyn SessionContext) -> Result<(), RouterError> {
        if let Some((semester, course)) = self.matched().and_then(MatchResult::course_segments) {
            tracing::debug!(semester = %semester, course = %course, "Loading course context");
            session.load_course_context(semester, course).inspect_err(|e| {
                tracing::error!(error = %e, "Course context failed to load");
            })?;
        }
        Ok(())
    }

    fn authorize(&mut self, session: &mut dyn SessionContext) -> Result<(), RouterError> {
        let facts = SessionFacts::read(session);

        if !facts.authenticated {
            if !self.is_auth_handler() {
                let old: String =
                    url::form_urlencoded::byte_serialize(self.original.path_only().as_bytes()).collect();
                let login = RequestTarget::get(self.policy.login_path.as_str()).with_query(OLD_PARAM, old);
                self.substitute(RedirectReason::Login, login);
            }
        } else if !facts.user_loaded {
            session.load_current_user().inspect_err(|e| {
                tracing::error!(error = %e, "Current user failed to load");
            })?;
            if !self.is_auth_handler() {
                let facts = SessionFacts::read(session);
                match self.no_access_target(&facts) {
                    Some(target) => self.substitute(RedirectReason::NoAccess, target),
                    None => tracing::debug!("No course to deny access to; deferring to course fallback"),
                }
            }
        } else if facts.course_loaded && !self.is_auth_handler() {
            if let Some(course) = facts.course_context() {
                if !session.can_view(&course) {
                    tracing::debug!(course = %course, "Course view denied");
                    if let Some(target) = self.no_access_target(&facts) {
                        self.substitute(RedirectReason::NoAccess, target);
                    }
                }
            }
        }
        Ok(())
    }

    fn course_fallback(&mut self, facts: &SessionFacts) {
        if facts.course_loaded {
            return;
        }
        if facts.authenticated {
            if self.is_logout_handler() {
                let logout = RequestTarget::get(self.policy.logout_path.as_str());
                self.substitute(RedirectReason::Logout, logout);
            } else if !self.is_home_handler() {
                let home = RequestTarget::get(self.policy.home_path.as_str());
                self.substitute(RedirectReason::Home, home);
            }
        } else if !self.is_auth_handler() {
            let login = RequestTarget::get(self.policy.login_path.as_str());
            self.substitute(RedirectReason::Login, login);
        }
    }

    /// `/{semester}/{course}/no_access`, taking the course from the matched
    /// route first and the loaded course context second.
    fn no_access_target(&self, facts: &SessionFacts) -> Option<RequestTarget> {
        let (semester, course) = match self.matched().and_then(MatchResult::course_segments) {
            Some((semester, course)) => (semester.to_string(), course.to_string()),
            None => (facts.semester.clone()?, facts.course.clone()?),
        };
        Some(RequestTarget::get(self.policy.no_access_path(&semester, &course)))
    }

    fn substitute(&mut self, reason: RedirectReason, target: RequestTarget) {
        tracing::info!(
            reason = reason.as_str(),
            from = %self.target,
            to = %target,
            "Substituting request target"
        );
        metrics::record_redirect(reason.as_str());

        self.current = match self.matcher.match_target(&target) {
            Some(m) if m.is_navigation_handler => {
                tracing::warn!(to = %target, "Substitute resolved to the navigation page");
                Current::Missing
            }
            Some(m) => Current::Matched(m),
            None => {
                tracing::warn!(to = %target, "Substitute matched no route");
                Current::Missing
            }
        };
        self.redirects.push(Redirect {
            reason,
            target: target.clone(),
        });
        self.target = target;
    }

    fn finish(self) -> ResolvedRoute {
        match self.current {
            Current::Matched(route) => ResolvedRoute::Matched(Resolution {
                route,
                target: self.target,
                redirects: self.redirects,
            }),
            Current::Unresolved | Current::Missing => ResolvedRoute::NotFound,
        }
    }
}
