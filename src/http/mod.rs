//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, surface selection)
//!     → request.rs (request ID, session id)
//!     → [resolver decides the final route]
//!     → [dispatcher invokes the handler]
//!     → response.rs (reply or failure envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID, X_SESSION_ID};
pub use server::{AppState, HttpServer};
