//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (session_id cookie / X-Session-Id)
//!     → store.rs (session id → user id)
//!     → StoreSession (per-request SessionContext)
//!     → facts.rs (SessionFacts snapshots for the resolver)
//! ```
//!
//! # Design Decisions
//! - One SessionContext value per request, passed explicitly
//! - The resolver reads facts through snapshots, never ambient state

pub mod context;
pub mod facts;
pub mod store;

pub use context::{CourseContext, SessionContext, User};
pub use facts::SessionFacts;
pub use store::{Directory, SessionStore, StoreSession};
