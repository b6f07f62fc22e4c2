//! Course Router Library
//!
//! Resolves HTTP requests to handlers through a course-aware access policy:
//! anonymous users are sent to the login page, users without access to a
//! course see its no-access page, and course-less requests fall back to the
//! home or login page.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod routing;
pub mod session;

pub use config::schema::RouterConfig;
pub use error::RouterError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolver::{ResolvedRoute, Resolver, Surface};
