//! HTTP server for the webca UI.
//!
//! Binds every browser to a server-side session through the `goSessionId`
//! cookie, guards the UI behind a login and evicts idle sessions in the
//! background.
//!
//! # Features
//!
//! - Cookie-bound sessions with server-side state
//! - Login/logout against configured accounts
//! - Access control with an optional faked login for development
//! - Periodic eviction of expired sessions
//! - Request logging
//!
//! # Example
//!
//! ```ignore
//! use webca_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:8080".parse()?);
//! Server::new(config).run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod cookies;
pub mod error;
pub mod logging;
pub mod routes;
pub mod session;
pub mod state;

pub use auth::{UserAccount, faked_user, hash_password};
pub use config::ServerConfig;
pub use cookies::{RequestHeaders, ResponseHeaders};
pub use error::{ErrorResponse, Result, ServerError};
pub use logging::request_logging_middleware;
pub use session::{CurrentSession, access_control, session_middleware};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The webca HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Get the application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::post;

        Router::new()
            // No session needed to check the server or to log out
            .merge(routes::health_routes())
            .route("/logout", post(routes::logout_handler))
            .merge(self.session_routes())
            // Request logging (inner layer)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Routes bound to a session.
    fn session_routes(&self) -> Router<AppState> {
        use axum::routing::post;

        Router::new()
            .route("/login", post(routes::login_handler))
            .merge(self.protected_routes())
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                session::session_middleware,
            ))
    }

    /// Routes that require a logged-in session.
    fn protected_routes(&self) -> Router<AppState> {
        use axum::routing::{get, put};

        Router::new()
            .route("/api/session", get(routes::get_session_handler))
            .route(
                "/api/session/data/{key}",
                put(routes::put_value_handler).delete(routes::delete_value_handler),
            )
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                session::access_control,
            ))
    }

    /// Run the server until it fails.
    pub async fn run(self) -> Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run the server until `signal` resolves.
    ///
    /// The expiration reaper runs for as long as the server does.
    pub async fn run_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        self.serve(listener, signal).await
    }

    /// Serve on an already bound listener (useful for testing).
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let reaper = self.state.registry().spawn_reaper(CancellationToken::new());

        match listener.local_addr() {
            Ok(addr) => info!("Starting server on {}", addr),
            Err(_) => info!("Starting server"),
        }

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(signal)
            .await;

        reaper.shutdown().await;
        info!("Server stopped");

        served.map_err(|e| ServerError::Internal(format!("Server error: {}", e)))
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
