//! Course Router
//!
//! Serves a course web application's routes behind a redirecting access
//! policy, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ matcher ──▶ resolver ──▶ dispatcher ──▶ handler
//!                      (axum)        (route      (web / API     (param
//!                                     table)      policy)        merge)
//!
//!     Cross-cutting: config (+ hot reload), session store, observability, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use course_router::config::{load_config, RouterConfig};
use course_router::config::watcher::ConfigWatcher;
use course_router::lifecycle::{signals, Shutdown};
use course_router::observability::{logging, metrics};
use course_router::handlers;
use course_router::HttpServer;

#[derive(Parser)]
#[command(name = "course-router")]
#[command(about = "Course-aware request router", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration, print the route table and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    if cli.check {
        let table = handlers::check_routes(&config)?;
        for route in table.iter() {
            println!("{:<16} {:<6} {:<48} {}", route.name(), route.method().as_str(), route.template(), route.handler());
        }
        println!("{} routes OK", table.len());
        return Ok(());
    }

    logging::init(&config.observability)?;
    tracing::info!("course-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        courses = config.courses.len(),
        users = config.users.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // The watcher must outlive the server for change events to flow.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.routes_dir.as_deref());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::with_builtin_handlers(config)?;
    server.run(listener, config_updates, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
