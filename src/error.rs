//! Error taxonomy for resolution and dispatch.
//!
//! `NoMatch`, `NotFound` and `Unauthorized` are routing outcomes, not errors;
//! they live on [`crate::resolver::ResolvedRoute`]. Everything here is a
//! genuine failure that propagates to the caller unchanged.

use thiserror::Error;

use crate::dispatch::HandlerError;
use crate::routing::{HandlerKey, PatternError};

/// Failures raised while resolving or dispatching a request.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The course context named by the request does not exist.
    #[error("unable to load course config for {semester}/{course}")]
    ConfigLoad { semester: String, course: String },

    /// The session collaborator could not load the current user.
    #[error("unable to load current user: {reason}")]
    UserLoad { reason: String },

    /// A route resolved to a handler nobody registered.
    #[error("no handler registered for {0}")]
    UnknownHandler(HandlerKey),

    /// Routes reference handlers missing from the registry.
    #[error("routes reference unregistered handlers: {}", join_keys(.0))]
    UnboundHandlers(Vec<HandlerKey>),

    /// A route declaration could not be compiled.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The invoked handler failed.
    #[error("handler {handler} failed: {source}")]
    Handler {
        handler: HandlerKey,
        #[source]
        source: HandlerError,
    },
}

fn join_keys(keys: &[HandlerKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
