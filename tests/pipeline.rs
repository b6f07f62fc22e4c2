//! Library-level tests: matcher → resolver → dispatcher, no network.

use std::sync::Arc;

use axum::http::Method;
use serde_json::Value;

use course_router::config::PolicyConfig;
use course_router::dispatch::{Dispatcher, Reply};
use course_router::handlers;
use course_router::resolver::{RedirectReason, ResolvedRoute, Resolver};
use course_router::routing::{RequestTarget, RouteTable, TableMatcher};
use course_router::session::{Directory, SessionStore, StoreSession};
use course_router::RouterConfig;

mod common;

struct Pipeline {
    config: RouterConfig,
    matcher: TableMatcher,
    dispatcher: Dispatcher,
    sessions: SessionStore,
    directory: Arc<Directory>,
}

impl Pipeline {
    fn new() -> Self {
        let config = common::test_config();
        let table = Arc::new(RouteTable::build(&config.routes).unwrap());
        let matcher = TableMatcher::new(table, config.policy.navigation.clone());
        let sessions = SessionStore::new();
        let directory = Arc::new(Directory::from_config(&config.users, &config.courses));
        let registry = handlers::builtin(&config.policy, sessions.clone(), directory.clone());
        Self {
            config,
            matcher,
            dispatcher: Dispatcher::new(Arc::new(registry)),
            sessions,
            directory,
        }
    }

    fn policy(&self) -> &PolicyConfig {
        &self.config.policy
    }

    fn resolve(&self, target: RequestTarget, session_id: Option<&str>) -> ResolvedRoute {
        let mut session = StoreSession::open(&self.sessions, self.directory.clone(), session_id);
        Resolver::web(&self.matcher, self.policy())
            .resolve(target, &mut session)
            .unwrap()
    }
}

fn json(reply: Reply) -> Value {
    match reply {
        Reply::Json(value) => value,
        other => panic!("expected JSON, got {other:?}"),
    }
}

#[test]
fn test_anonymous_course_request_carries_old_path_to_login() {
    let pipeline = Pipeline::new();

    let resolved = pipeline.resolve(RequestTarget::get("/2024_fall/cs101/gradeable/hw1"), None);
    let resolution = resolved.resolution().unwrap();
    assert_eq!(resolution.route.route, "login");
    assert_eq!(resolution.redirects.len(), 1);
    assert_eq!(resolution.redirects[0].reason, RedirectReason::Login);

    let reply = pipeline
        .dispatcher
        .dispatch(&resolution.route, &resolution.target.query)
        .unwrap();
    assert_eq!(json(reply)["data"]["old"], "%2F2024_fall%2Fcs101%2Fgradeable%2Fhw1");
}

#[test]
fn test_login_then_return_to_course_page() {
    let pipeline = Pipeline::new();

    let check = RequestTarget::new(Method::POST, "/authentication/check_login")
        .with_query("user_id", "alice")
        .with_query("old", "%2F2024_fall%2Fcs101%2Fgradeable%2Fhw1");
    let resolved = pipeline.resolve(check, None);
    let resolution = resolved.resolution().unwrap();
    assert!(resolution.redirects.is_empty());

    let reply = json(
        pipeline
            .dispatcher
            .dispatch(&resolution.route, &resolution.target.query)
            .unwrap(),
    );
    assert_eq!(reply["data"]["redirect"], "/2024_fall/cs101/gradeable/hw1");
    let session_id = reply["data"]["session_id"].as_str().unwrap().to_string();

    let resolved = pipeline.resolve(RequestTarget::get("/2024_fall/cs101/gradeable/hw1"), Some(session_id.as_str()));
    let resolution = resolved.resolution().unwrap();
    assert_eq!(resolution.route.route, "gradeable");
    assert!(resolution.redirects.is_empty());

    let reply = json(
        pipeline
            .dispatcher
            .dispatch(&resolution.route, &resolution.target.query)
            .unwrap(),
    );
    assert_eq!(reply["data"]["gradeable_id"], "hw1");
}

#[test]
fn test_course_params_never_reach_handlers() {
    let pipeline = Pipeline::new();
    let session_id = pipeline.sessions.create("alice");

    let target = RequestTarget::get("/2024_fall/cs101/gradeable/hw1").with_query("gradeable_id", "other");
    let resolved = pipeline.resolve(target, Some(session_id.as_str()));
    let resolution = resolved.resolution().unwrap();

    let params = course_router::dispatch::handler_params(&resolution.route.path_params, &resolution.target.query);
    assert_eq!(params.get("gradeable_id").map(String::as_str), Some("hw1"));
    assert!(params.keys().all(|k| !k.starts_with('_')));
}

#[test]
fn test_api_surface_rejects_anonymous() {
    let pipeline = Pipeline::new();
    let mut session = StoreSession::open(&pipeline.sessions, pipeline.directory.clone(), None);

    let resolved = Resolver::api(&pipeline.matcher, pipeline.policy())
        .resolve(RequestTarget::get("/api/courses"), &mut session)
        .unwrap();
    assert_eq!(resolved, ResolvedRoute::Unauthorized);
}
