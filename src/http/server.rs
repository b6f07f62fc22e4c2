//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Bind server to listener
//! - Pick the web or API policy per request and resolve the route
//! - Dispatch the resolved route and render the outcome
//! - Swap in reloaded route tables without dropping in-flight requests

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{PolicyConfig, RouterConfig};
use crate::dispatch::{Dispatcher, HandlerRegistry};
use crate::error::RouterError;
use crate::handlers::{self, SESSION_PARAM};
use crate::http::request::{request_id, session_id, UuidRequestId};
use crate::http::response::{failure, NOT_FOUND_MESSAGE, UNAUTHORIZED_MESSAGE};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resolver::{ResolvedRoute, Resolver, Surface};
use crate::routing::{RequestTarget, RouteTable, TableMatcher};
use crate::session::{Directory, SessionStore, StoreSession};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<ArcSwap<RouteTable>>,
    pub policy: Arc<PolicyConfig>,
    pub dispatcher: Dispatcher,
    pub sessions: SessionStore,
    pub directory: Arc<Directory>,
}

impl AppState {
    /// Rebuild the route table from `config` and swap it in.
    ///
    /// The current table stays active if the new one fails to compile or
    /// routes to a handler that is not registered.
    pub fn reload_routes(&self, config: &RouterConfig) -> Result<usize, RouterError> {
        let table = RouteTable::build(&config.routes)?;
        self.dispatcher.registry().verify(&table)?;

        if config.policy != *self.policy {
            tracing::warn!("Policy changes require a restart and were not applied");
        }

        let count = table.len();
        self.routes.store(Arc::new(table));
        metrics::record_route_count(count);
        Ok(count)
    }
}

/// HTTP server for the course router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server serving `registry`'s handlers.
    ///
    /// Fails if a route template does not compile or a routed handler is
    /// missing from the registry.
    pub fn new(
        config: RouterConfig,
        registry: HandlerRegistry,
        sessions: SessionStore,
        directory: Arc<Directory>,
    ) -> Result<Self, RouterError> {
        let table = RouteTable::build(&config.routes)?;
        registry.verify(&table)?;
        metrics::record_route_count(table.len());

        let state = AppState {
            routes: Arc::new(ArcSwap::from_pointee(table)),
            policy: Arc::new(config.policy.clone()),
            dispatcher: Dispatcher::new(Arc::new(registry)),
            sessions,
            directory,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Create a server with the built-in handlers and a fresh session store
    /// using the configured idle timeout.
    pub fn with_builtin_handlers(config: RouterConfig) -> Result<Self, RouterError> {
        let sessions =
            SessionStore::with_idle_timeout(Duration::from_secs(config.sessions.idle_timeout_secs));
        let directory = Arc::new(Directory::from_config(&config.users, &config.courses));
        let registry = handlers::builtin(&config.policy, sessions.clone(), directory.clone());
        Self::new(config, registry, sessions, directory)
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/{*path}", any(route_handler))
            .route("/", any(route_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs arriving on `config_updates` replace the route table. The
    /// server drains in-flight requests and returns once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.routes.load().len(),
            "HTTP server starting"
        );

        let state = self.state.clone();
        let reload_shutdown = shutdown.clone();
        tokio::spawn(async move {
            loop {
                let new_config = tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => config,
                        None => break,
                    },
                    _ = reload_shutdown.wait() => break,
                };
                match state.reload_routes(&new_config) {
                    Ok(count) => tracing::info!(routes = count, "Route table reloaded"),
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected route update. Keeping current route table.")
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Catch-all handler: resolve, authorize, dispatch.
async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let session_id = session_id(request.headers());

    let surface = if state.policy.is_api_path(request.uri().path()) {
        Surface::Api
    } else {
        Surface::Web
    };
    let target = RequestTarget::from_uri(request.method().clone(), request.uri());

    tracing::debug!(
        request_id = %request_id,
        surface = surface.as_str(),
        target = %target,
        "Resolving request"
    );

    let (response, outcome) = serve(&state, surface, target, session_id.as_deref(), &request_id);
    metrics::record_request(surface.as_str(), outcome, start);
    response
}

fn serve(
    state: &AppState,
    surface: Surface,
    target: RequestTarget,
    session_id: Option<&str>,
    request_id: &str,
) -> (Response, &'static str) {
    let mut session = StoreSession::open(&state.sessions, state.directory.clone(), session_id);
    let matcher = TableMatcher::new(state.routes.load_full(), state.policy.navigation.clone());
    let resolver = Resolver::new(&matcher, &state.policy, surface);

    let resolved = match resolver.resolve(target, &mut session) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Route resolution failed");
            return (failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()), "error");
        }
    };

    let resolution = match resolved {
        ResolvedRoute::Matched(resolution) => resolution,
        ResolvedRoute::NotFound => {
            tracing::warn!(request_id = %request_id, "No route matched");
            return (failure(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE), "not_found");
        }
        ResolvedRoute::Unauthorized => {
            tracing::warn!(request_id = %request_id, "Rejected unauthenticated API request");
            return (failure(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE), "unauthorized");
        }
    };

    let mut query = resolution.target.query.clone();
    match session_id {
        Some(id) => {
            query.insert(SESSION_PARAM.to_string(), id.to_string());
        }
        None => {
            query.remove(SESSION_PARAM);
        }
    }

    match state.dispatcher.dispatch(&resolution.route, &query) {
        Ok(reply) => {
            let outcome = if resolution.redirects.is_empty() {
                "served"
            } else {
                "redirected"
            };
            tracing::debug!(
                request_id = %request_id,
                route = %resolution.route.route,
                redirects = resolution.redirects.len(),
                "Dispatched"
            );
            (reply.into_response(), outcome)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Handler failed");
            (failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()), "error")
        }
    }
}
