//! # SpaceBio HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /search` - Filter the catalog (`q`, `category`, `mission`, `from`, `to`)
//! - `GET /filters` - Facet table with declared and live counts
//! - `GET /publications` - Every record in catalog order
//! - `GET /publications/{id}` - One record in the detail view (`?tab=`)
//! - `GET /publications/{id}/knowledge-graph` - Knowledge graph tab
//! - `GET /publications/{id}/data` - Data & Methods tab
//! - `POST /publications/{id}/citation|export|share|download` - Mock actions
//! - `GET /actions` - Action status board
//! - `DELETE /actions/{action}` - Cancel a pending action
//! - `POST /auth/register|login|forgot-password|password-strength`
//! - `POST /auth/logout`, `GET /auth/me`, `GET|PUT /profile` - Bearer session required
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `SPACEBIO_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `SPACEBIO_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{SessionToken, bearer_token};
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
#[allow(unused_imports)]
pub use types::{
    ActionResponse, ActionStatusJson, ActionsResponse, AuthResponse, CitationRequest,
    DownloadRequest, HealthResponse, LoginRequest, PublicationListResponse, PublicationResponse,
    SearchQuery, TabJson,
};

use crate::{actions::ActionRunner, config::AppConfig};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use spacebio_core::{Catalog, IdentityService, MemoryPlatform, SpaceBioError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// The catalog is read-only after startup. The identity service is shared
/// by every user; each caller holds its own session token.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub identity: Arc<RwLock<IdentityService<MemoryPlatform>>>,
    pub actions: ActionRunner,
    /// Base of the links handed out by the share action.
    pub public_url: Arc<str>,
}

impl AppState {
    /// State with default configuration.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self::from_config(catalog, &AppConfig::default())
    }

    #[must_use]
    pub fn from_config(catalog: Catalog, config: &AppConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            identity: Arc::new(RwLock::new(IdentityService::new(MemoryPlatform::new()))),
            actions: ActionRunner::new(config.actions.delays(), config.actions.timeout()),
            public_url: Arc::from(config.server.public_url.as_str()),
        }
    }

    /// Replace the action runner, e.g. with shorter delays.
    #[must_use]
    pub fn with_actions(mut self, actions: ActionRunner) -> Self {
        self.actions = actions;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `SPACEBIO_CORS_ORIGINS`.
///
/// - "*": allows all origins (development only)
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("SPACEBIO_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (SPACEBIO_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in SPACEBIO_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                cors_for(allowed_origins)
            }
        }
        None => {
            tracing::info!("CORS: No SPACEBIO_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

fn cors_for(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Localhost origins of the dev server and the API itself.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    cors_for(origins)
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - global quota (if enabled)
/// 4. Session - bearer token on account routes only
pub fn create_router(state: AppState) -> Router {
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let account = Router::new()
        .route("/auth/logout", post(handlers::logout_handler))
        .route("/auth/me", get(handlers::profile_handler))
        .route(
            "/profile",
            get(handlers::profile_handler).put(handlers::update_profile_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/search", get(handlers::search_handler))
        .route("/filters", get(handlers::filters_handler))
        .route("/publications", get(handlers::list_publications_handler))
        .route("/publications/{id}", get(handlers::publication_handler))
        .route(
            "/publications/{id}/knowledge-graph",
            get(handlers::knowledge_graph_handler),
        )
        .route("/publications/{id}/data", get(handlers::dataset_handler))
        .route(
            "/publications/{id}/citation",
            post(handlers::citation_handler),
        )
        .route("/publications/{id}/export", post(handlers::export_handler))
        .route("/publications/{id}/share", post(handlers::share_handler))
        .route(
            "/publications/{id}/download",
            post(handlers::download_handler),
        )
        .route("/actions", get(handlers::actions_handler))
        .route(
            "/actions/{action}",
            delete(handlers::cancel_action_handler),
        )
        .route("/auth/register", post(handlers::register_handler))
        .route("/auth/login", post(handlers::login_handler))
        .route(
            "/auth/forgot-password",
            post(handlers::forgot_password_handler),
        )
        .route(
            "/auth/password-strength",
            post(handlers::password_strength_handler),
        )
        .merge(account);

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(axum::extract::DefaultBodyLimit::max(64 * 1024)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), SpaceBioError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SpaceBioError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("SpaceBio HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SpaceBioError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
