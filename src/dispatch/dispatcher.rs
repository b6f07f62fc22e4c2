//! Handler invocation for resolved routes.

use std::sync::Arc;

use crate::error::RouterError;
use crate::routing::target::SYNTHETIC_PREFIX;
use crate::routing::{MatchResult, Params};

use super::registry::{HandlerRegistry, Reply};

/// Build the parameters a handler is invoked with.
///
/// Synthetic (`_`-prefixed) entries are dropped from the path parameters.
/// Query parameters fill in the rest but never override a path parameter.
pub fn handler_params(path_params: &Params, query: &Params) -> Params {
    let mut merged: Params = path_params
        .iter()
        .filter(|(key, _)| !key.starts_with(SYNTHETIC_PREFIX))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (key, value) in query {
        merged.entry(key.clone()).or_insert_with(|| value.clone());
    }
    merged
}

/// Invokes handlers from a registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Invoke the handler behind `route` with its path and query parameters.
    pub fn dispatch(&self, route: &MatchResult, query: &Params) -> Result<Reply, RouterError> {
        let handler = self
            .registry
            .get(&route.handler)
            .ok_or_else(|| RouterError::UnknownHandler(route.handler.clone()))?;

        let params = handler_params(&route.path_params, query);
        tracing::debug!(
            handler = %route.handler,
            route = %route.route,
            params = params.len(),
            "Dispatching"
        );

        handler.call(&params).map_err(|source| RouterError::Handler {
            handler: route.handler.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::HandlerError;
    use crate::routing::HandlerKey;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn route(handler: HandlerKey, path_params: Params) -> MatchResult {
        MatchResult {
            route: "test".into(),
            handler,
            path_params,
            is_navigation_handler: false,
        }
    }

    #[test]
    fn test_path_params_win_over_query() {
        let merged = handler_params(&params(&[("id", "5")]), &params(&[("id", "9"), ("sort", "asc")]));
        assert_eq!(merged, params(&[("id", "5"), ("sort", "asc")]));
    }

    #[test]
    fn test_synthetic_params_dropped() {
        let path = params(&[
            ("_controller", "course"),
            ("_method", "gradeable"),
            ("_route", "gradeable"),
            ("_semester", "2024_fall"),
            ("_course", "cs101"),
            ("gradeable_id", "hw1"),
        ]);
        let merged = handler_params(&path, &params(&[("_method", "evil")]));
        // Query keys are merged as-is; only path metadata is stripped.
        assert_eq!(merged, params(&[("_method", "evil"), ("gradeable_id", "hw1")]));
    }

    #[test]
    fn test_dispatch_invokes_registered_handler() {
        let key = HandlerKey::new("course", "gradeable");
        let mut registry = HandlerRegistry::new();
        registry.register(key.clone(), |p: &Params| -> Result<Reply, HandlerError> {
            Ok(Reply::Html(format!("{}:{}", p["gradeable_id"], p["sort"])))
        });
        let dispatcher = Dispatcher::new(Arc::new(registry));

        let reply = dispatcher
            .dispatch(
                &route(key, params(&[("gradeable_id", "hw1"), ("_controller", "course")])),
                &params(&[("sort", "asc"), ("gradeable_id", "hw9")]),
            )
            .unwrap();
        assert_eq!(reply, Reply::Html("hw1:asc".into()));
    }

    #[test]
    fn test_dispatch_unknown_handler() {
        let dispatcher = Dispatcher::new(Arc::new(HandlerRegistry::new()));
        let err = dispatcher
            .dispatch(&route(HandlerKey::new("x", "y"), Params::new()), &Params::new())
            .unwrap_err();
        assert!(matches!(err, RouterError::UnknownHandler(k) if k == HandlerKey::new("x", "y")));
    }

    #[test]
    fn test_dispatch_handler_failure() {
        let key = HandlerKey::new("x", "y");
        let mut registry = HandlerRegistry::new();
        registry.register(key.clone(), |_: &Params| -> Result<Reply, HandlerError> {
            Err(HandlerError::new("boom"))
        });
        let dispatcher = Dispatcher::new(Arc::new(registry));

        let err = dispatcher.dispatch(&route(key, Params::new()), &Params::new()).unwrap_err();
        assert_eq!(err.to_string(), "handler x::y failed: boom");
    }
}
