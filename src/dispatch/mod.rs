//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! MatchResult (final) + query params
//!     → dispatcher.rs (strip synthetic params, merge query, path wins)
//!     → registry.rs (handler lookup by HandlerKey)
//!     → Handler::call → Reply
//! ```

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{handler_params, Dispatcher};
pub use registry::{Handler, HandlerError, HandlerRegistry, Reply};
