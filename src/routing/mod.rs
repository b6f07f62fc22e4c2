//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup / on reload):
//!     RouteConfig[] (inline + routes_dir files)
//!     → pattern.rs (compile templates)
//!     → table.rs (freeze as ordered RouteTable)
//!
//! Incoming Request:
//!     RequestTarget (method, path, query)
//!     → matcher.rs (first route in declaration order)
//!     → Return: MatchResult or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled up front, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

use std::collections::BTreeMap;

pub mod matcher;
pub mod pattern;
pub mod table;
pub mod target;

/// Route and query parameters, ordered by key.
pub type Params = BTreeMap<String, String>;

pub use matcher::{Matcher, TableMatcher};
pub use pattern::{HandlerKey, PatternError, RoutePattern};
pub use table::RouteTable;
pub use target::{MatchResult, RequestTarget};
