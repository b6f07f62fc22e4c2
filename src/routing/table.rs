//! Route table construction.
//!
//! # Responsibilities
//! - Compile route declarations into an ordered, immutable table
//! - Load declarations from a directory of route files
//!
//! # Design Decisions
//! - Declaration order is precedence order; nothing is re-sorted
//! - A table is never mutated once built; reloads build a fresh one

use std::path::Path;

use crate::config::loader::{load_route_files, ConfigError};
use crate::config::RouteConfig;

use super::{HandlerKey, PatternError, RoutePattern};

/// Ordered set of compiled routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RoutePattern>,
}

impl RouteTable {
    pub fn new(routes: Vec<RoutePattern>) -> Self {
        Self { routes }
    }

    /// Compile declarations, keeping their order.
    pub fn build(declarations: &[RouteConfig]) -> Result<Self, PatternError> {
        declarations
            .iter()
            .map(RouteConfig::compile)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Compile every route file in `dir`, in file-name order.
    pub fn load_routes(dir: &Path) -> Result<Self, ConfigError> {
        let declarations = load_route_files(dir)?;
        Self::build(&declarations).map_err(ConfigError::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutePattern> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every handler referenced by the table, deduplicated and sorted.
    pub fn handlers(&self) -> Vec<&HandlerKey> {
        let mut keys: Vec<&HandlerKey> = self.routes.iter().map(RoutePattern::handler).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str, path: &str, handler: &str) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            method: "GET".into(),
            path: path.into(),
            handler: handler.parse().unwrap(),
        }
    }

    #[test]
    fn test_build_keeps_declaration_order() {
        let table = RouteTable::build(&[
            decl("b", "/b", "x::b"),
            decl("a", "/a", "x::a"),
        ])
        .unwrap();
        let names: Vec<_> = table.iter().map(RoutePattern::name).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_build_fails_on_bad_template() {
        let err = RouteTable::build(&[decl("bad", "nope", "x::a")]).unwrap_err();
        assert!(matches!(err, PatternError::MissingLeadingSlash { .. }));
    }

    #[test]
    fn test_handlers_deduplicated() {
        let table = RouteTable::build(&[
            decl("a", "/a", "x::a"),
            decl("b", "/b", "x::a"),
            decl("c", "/c", "w::c"),
        ])
        .unwrap();
        let keys: Vec<String> = table.handlers().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["w::c", "x::a"]);
    }

    #[test]
    fn test_load_routes_keeps_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("20-course.toml"),
            "[[routes]]\nname = \"navigation\"\npath = \"/{_semester}/{_course}\"\nhandler = \"navigation::show\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("10-auth.toml"),
            "[[routes]]\nname = \"login\"\npath = \"/authentication/login\"\nhandler = \"authentication::login_form\"\n\n\
             [[routes]]\nname = \"check\"\nmethod = \"POST\"\npath = \"/authentication/check_login\"\nhandler = \"authentication::check_login\"\n",
        )
        .unwrap();

        let table = RouteTable::load_routes(dir.path()).unwrap();
        let names: Vec<_> = table.iter().map(RoutePattern::name).collect();
        assert_eq!(names, ["login", "check", "navigation"]);
    }

    #[test]
    fn test_load_routes_rejects_bad_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("routes.toml"),
            "[[routes]]\nname = \"bad\"\npath = \"no-slash\"\nhandler = \"x::a\"\n",
        )
        .unwrap();

        let err = RouteTable::load_routes(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern(PatternError::MissingLeadingSlash { .. })));
    }
}
