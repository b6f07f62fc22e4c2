//! Handler registry.
//!
//! # Responsibilities
//! - Map handler keys to callable units
//! - Check at startup (and on reload) that every routed handler exists
//!
//! # Design Decisions
//! - Handlers are plain trait objects; closures implement the trait
//! - Lookups never allocate; the registry is read-only once the server starts

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::error::RouterError;
use crate::routing::{HandlerKey, Params, RouteTable};

/// What a handler produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(Value),
    Html(String),
    Redirect(String),
}

impl Reply {
    /// `{"status": "success", "data": ...}`
    pub fn success(data: Value) -> Self {
        Reply::Json(serde_json::json!({ "status": "success", "data": data }))
    }

    /// `{"status": "fail", "message": ...}`
    pub fn fail(message: impl Into<String>) -> Self {
        Reply::Json(serde_json::json!({ "status": "fail", "message": message.into() }))
    }
}

/// A handler failure, opaque to the router.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A unit of code producing a reply for a matched route.
pub trait Handler: Send + Sync {
    fn call(&self, params: &Params) -> Result<Reply, HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&Params) -> Result<Reply, HandlerError> + Send + Sync,
{
    fn call(&self, params: &Params) -> Result<Reply, HandlerError> {
        self(params)
    }
}

/// Handler keys mapped to handlers.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerKey, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `key`, replacing any previous one.
    pub fn register(&mut self, key: HandlerKey, handler: impl Handler + 'static) -> &mut Self {
        self.handlers.insert(key, Arc::new(handler));
        self
    }

    pub fn get(&self, key: &HandlerKey) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(key)
    }

    pub fn contains(&self, key: &HandlerKey) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Fail if any route in `table` names an unregistered handler.
    pub fn verify(&self, table: &RouteTable) -> Result<(), RouterError> {
        let missing: Vec<HandlerKey> = table
            .handlers()
            .into_iter()
            .filter(|key| !self.contains(key))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RouterError::UnboundHandlers(missing))
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    fn ok(_: &Params) -> Result<Reply, HandlerError> {
        Ok(Reply::Html("ok".into()))
    }

    #[test]
    fn test_register_and_call() {
        let mut registry = HandlerRegistry::new();
        registry.register(HandlerKey::new("home", "show"), ok);

        let handler = registry.get(&HandlerKey::new("home", "show")).unwrap();
        assert_eq!(handler.call(&Params::new()), Ok(Reply::Html("ok".into())));
        assert!(registry.get(&HandlerKey::new("home", "other")).is_none());
    }

    #[test]
    fn test_verify_reports_missing_handlers() {
        let table = RouteTable::build(&[
            RouteConfig::new("home", "GET", "/home", HandlerKey::new("home", "show")),
            RouteConfig::new("a", "GET", "/a", HandlerKey::new("x", "a")),
            RouteConfig::new("b", "GET", "/b", HandlerKey::new("x", "b")),
        ])
        .unwrap();

        let mut registry = HandlerRegistry::new();
        registry.register(HandlerKey::new("home", "show"), ok);

        match registry.verify(&table) {
            Err(RouterError::UnboundHandlers(missing)) => {
                assert_eq!(missing, vec![HandlerKey::new("x", "a"), HandlerKey::new("x", "b")]);
            }
            other => panic!("expected unbound handlers, got {:?}", other),
        }

        registry.register(HandlerKey::new("x", "a"), ok).register(HandlerKey::new("x", "b"), ok);
        assert!(registry.verify(&table).is_ok());
    }

    #[test]
    fn test_reply_envelopes() {
        assert_eq!(
            Reply::fail("nope"),
            Reply::Json(serde_json::json!({ "status": "fail", "message": "nope" }))
        );
        assert_eq!(
            Reply::success(serde_json::json!([1])),
            Reply::Json(serde_json::json!({ "status": "success", "data": [1] }))
        );
    }
}
