//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + routes_dir/*.toml
//!     → loader.rs (parse & deserialize, append route files)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! On change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps in a new RouteTable
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the route table is hot-swapped
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CourseConfig, ListenerConfig, LogFormat, ObservabilityConfig, PolicyConfig, RouteConfig,
    RouterConfig, SessionConfig, TimeoutConfig, UserConfig,
};
