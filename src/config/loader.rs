//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{RouteConfig, RouteFile, RouterConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::PatternError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// Route files under `routes_dir` are appended after the inline routes.
/// A relative `routes_dir` is resolved against the config file's directory.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = read(path)?;
    let mut config: RouterConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(dir) = config.routes_dir.take() {
        let dir = match path.parent() {
            Some(parent) if dir.is_relative() => parent.join(dir),
            _ => dir,
        };
        config.routes.extend(load_route_files(&dir)?);
        config.routes_dir = Some(dir);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), routes = config.routes.len(), "Configuration parsed");
    Ok(config)
}

/// Read every `*.toml` route file in `dir`, in file-name order.
pub fn load_route_files(dir: &Path) -> Result<Vec<RouteConfig>, ConfigError> {
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();

    let mut routes = Vec::new();
    for file in files {
        let content = read(&file)?;
        let parsed: RouteFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: file.clone(),
            source,
        })?;
        tracing::debug!(file = %file.display(), routes = parsed.routes.len(), "Loaded route file");
        routes.extend(parsed.routes);
    }
    Ok(routes)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_route_files_loaded_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("20-course.toml"),
            "[[routes]]\nname = \"course\"\npath = \"/{_semester}/{_course}\"\nhandler = \"navigation::show\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("10-auth.toml"),
            "[[routes]]\nname = \"login\"\npath = \"/authentication/login\"\nhandler = \"authentication::login_form\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let routes = load_route_files(dir.path()).unwrap();
        let names: Vec<_> = routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["login", "course"]);
    }

    #[test]
    fn test_load_config_appends_routes_dir() {
        let dir = tempdir().unwrap();
        let routes_dir = dir.path().join("routes");
        fs::create_dir_all(&routes_dir).unwrap();
        fs::write(
            routes_dir.join("extra.toml"),
            "[[routes]]\nname = \"extra\"\npath = \"/{_semester}/{_course}/extra\"\nhandler = \"course::extra\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("router.toml"), "routes_dir = \"routes\"\n").unwrap();

        let config = load_config(&dir.path().join("router.toml")).unwrap();
        assert_eq!(config.routes.last().unwrap().name, "extra");
        assert_eq!(config.routes_dir, Some(routes_dir));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("router.toml"), "routes = 5").unwrap();
        let err = load_config(&dir.path().join("router.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
