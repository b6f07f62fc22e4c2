//! Built-in handlers for the default route table.
//!
//! These back the login, home, course and navigation pages so the router can
//! be run on its own. Every reply is a JSON envelope.

use std::sync::Arc;

use serde_json::json;

use crate::config::{PolicyConfig, RouterConfig};
use crate::dispatch::{Handler, HandlerError, HandlerRegistry, Reply};
use crate::error::RouterError;
use crate::resolver::OLD_PARAM;
use crate::routing::{HandlerKey, Params, RouteTable};
use crate::session::{Directory, SessionStore};

/// Parameter carrying the caller's session id, set by the HTTP layer.
pub const SESSION_PARAM: &str = "session_id";

/// Parameter naming the user to sign in as.
pub const USER_PARAM: &str = "user_id";

/// Registry with every handler the default routes reference.
pub fn builtin(policy: &PolicyConfig, sessions: SessionStore, directory: Arc<Directory>) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register(HandlerKey::new("authentication", "login_form"), login_form)
        .register(
            HandlerKey::new("authentication", "check_login"),
            check_login(sessions.clone(), directory.clone(), policy.home_path.clone()),
        )
        .register(HandlerKey::new("authentication", "logout"), logout(sessions))
        .register(HandlerKey::new("home", "show"), home_page)
        .register(HandlerKey::new("home", "courses"), courses(directory))
        .register(HandlerKey::new("course", "no_access"), no_access)
        .register(HandlerKey::new("course", "gradeable"), gradeable)
        .register(HandlerKey::new("navigation", "show"), navigation);
    registry
}

/// Compile `config`'s routes and check each one has a built-in handler.
pub fn check_routes(config: &RouterConfig) -> Result<RouteTable, RouterError> {
    let table = RouteTable::build(&config.routes)?;
    let directory = Arc::new(Directory::from_config(&config.users, &config.courses));
    builtin(&config.policy, SessionStore::new(), directory).verify(&table)?;
    Ok(table)
}

fn login_form(params: &Params) -> Result<Reply, HandlerError> {
    Ok(Reply::success(json!({
        "page": "login",
        "old": params.get(OLD_PARAM),
    })))
}

fn check_login(sessions: SessionStore, directory: Arc<Directory>, home_path: String) -> impl Handler {
    move |params: &Params| -> Result<Reply, HandlerError> {
        let Some(user_id) = params.get(USER_PARAM).filter(|id| !id.is_empty()) else {
            return Ok(Reply::fail("Cannot leave user id blank"));
        };
        let Some(user) = directory.user(user_id) else {
            tracing::info!(user = %user_id, "Rejected login for unknown user");
            return Ok(Reply::fail("Could not login using that user id"));
        };

        let session_id = sessions.create(&user.id);
        let redirect = params
            .get(OLD_PARAM)
            .and_then(|old| return_path(old))
            .unwrap_or_else(|| home_path.clone());
        tracing::info!(user = %user.id, "User signed in");

        Ok(Reply::success(json!({
            "session_id": session_id,
            "user": { "id": user.id, "name": user.name },
            "redirect": redirect,
        })))
    }
}

fn logout(sessions: SessionStore) -> impl Handler {
    move |params: &Params| -> Result<Reply, HandlerError> {
        let ended = params
            .get(SESSION_PARAM)
            .is_some_and(|id| sessions.remove(id));
        Ok(Reply::success(json!({ "page": "logout", "ended": ended })))
    }
}

fn home_page(_params: &Params) -> Result<Reply, HandlerError> {
    Ok(Reply::success(json!({ "page": "home" })))
}

fn courses(directory: Arc<Directory>) -> impl Handler {
    move |_params: &Params| -> Result<Reply, HandlerError> {
        let courses: Vec<_> = directory
            .courses()
            .map(|c| json!({ "semester": c.semester, "course": c.course }))
            .collect();
        Ok(Reply::success(json!({ "courses": courses })))
    }
}

fn no_access(_params: &Params) -> Result<Reply, HandlerError> {
    Ok(Reply::success(json!({
        "page": "no_access",
        "message": "You don't have access to this course.",
    })))
}

fn gradeable(params: &Params) -> Result<Reply, HandlerError> {
    let id = params
        .get("gradeable_id")
        .ok_or_else(|| HandlerError::new("missing gradeable id"))?;
    Ok(Reply::success(json!({ "page": "gradeable", "gradeable_id": id })))
}

fn navigation(_params: &Params) -> Result<Reply, HandlerError> {
    Ok(Reply::success(json!({ "page": "navigation" })))
}

/// Decode an `old` value back to a local path.
///
/// Anything that is not an absolute path on this host is dropped.
fn return_path(old: &str) -> Option<String> {
    let (path, _) = url::form_urlencoded::parse(old.as_bytes()).next()?;
    (path.starts_with('/') && !path.starts_with("//")).then(|| path.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CourseConfig, UserConfig};

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn directory() -> Arc<Directory> {
        let users = vec![UserConfig {
            id: "alice".into(),
            name: "Alice".into(),
            superuser: false,
        }];
        let courses = vec![CourseConfig {
            semester: "2024_fall".into(),
            course: "cs101".into(),
            members: vec!["alice".into()],
        }];
        Arc::new(Directory::from_config(&users, &courses))
    }

    fn data(reply: Reply) -> serde_json::Value {
        match reply {
            Reply::Json(value) => value,
            other => panic!("expected JSON reply, got {other:?}"),
        }
    }

    #[test]
    fn test_builtin_covers_default_routes() {
        let registry = builtin(&PolicyConfig::default(), SessionStore::new(), directory());
        let table = crate::routing::RouteTable::build(&crate::config::schema::default_routes()).unwrap();
        assert!(registry.verify(&table).is_ok());
    }

    #[test]
    fn test_check_routes_reports_unbound_handlers() {
        let mut config = RouterConfig::default();
        assert!(check_routes(&config).is_ok());

        config.routes.push(crate::config::RouteConfig::new(
            "reports",
            "GET",
            "/reports",
            HandlerKey::new("reports", "index"),
        ));
        match check_routes(&config) {
            Err(RouterError::UnboundHandlers(keys)) => {
                assert_eq!(keys, [HandlerKey::new("reports", "index")]);
            }
            other => panic!("expected unbound handlers, got {other:?}"),
        }
    }

    #[test]
    fn test_check_login_creates_session() {
        let sessions = SessionStore::new();
        let handler = check_login(sessions.clone(), directory(), "/home".into());

        let reply = data(
            handler
                .call(&params(&[("user_id", "alice"), ("old", "%2F2024_fall%2Fcs101")]))
                .unwrap(),
        );
        assert_eq!(reply["status"], "success");
        assert_eq!(reply["data"]["redirect"], "/2024_fall/cs101");

        let session_id = reply["data"]["session_id"].as_str().unwrap();
        assert_eq!(sessions.user_for(session_id).as_deref(), Some("alice"));
    }

    #[test]
    fn test_check_login_unknown_user() {
        let sessions = SessionStore::new();
        let handler = check_login(sessions.clone(), directory(), "/home".into());

        let reply = data(handler.call(&params(&[("user_id", "mallory")])).unwrap());
        assert_eq!(reply["status"], "fail");
        assert_eq!(sessions.count(), 0);
    }

    #[test]
    fn test_logout_ends_session() {
        let sessions = SessionStore::new();
        let id = sessions.create("alice");
        let handler = logout(sessions.clone());

        let reply = data(handler.call(&params(&[("session_id", id.as_str())])).unwrap());
        assert_eq!(reply["data"]["ended"], true);
        assert_eq!(sessions.count(), 0);
    }

    #[test]
    fn test_return_path_rejects_foreign_hosts() {
        assert_eq!(return_path("%2Fhome").as_deref(), Some("/home"));
        assert_eq!(return_path("%2F%2Fevil.example"), None);
        assert_eq!(return_path("https%3A%2F%2Fevil.example"), None);
    }

    #[test]
    fn test_gradeable_echoes_id() {
        let reply = data(gradeable(&params(&[("gradeable_id", "hw1")])).unwrap());
        assert_eq!(reply["data"]["gradeable_id"], "hw1");
        assert!(gradeable(&Params::new()).is_err());
    }
}
