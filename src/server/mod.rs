//! HTTP front end built on axum.
//!
//! Routes:
//! - GET /health (no auth)
//! - GET /resolve, /download, /media, /correlate (API key when configured)

mod auth;
mod handlers;

use crate::app::App;
use crate::error::TgErrorContext;
use crate::platform::Platform;
use crate::shutdown::ShutdownController;
use anyhow::Result;
use axum::{http::StatusCode, middleware, routing::get, Router};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use auth::ApiKey;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub api_key: Option<String>,
}

/// Shared state for request handlers.
pub struct ServerState<P: Platform> {
    pub app: App<P>,
}

impl<P: Platform> Clone for ServerState<P> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
        }
    }
}

pub fn router<P: Platform>(app: App<P>, api_key: ApiKey) -> Router {
    build_router(app, api_key, REQUEST_TIMEOUT)
}

fn build_router<P: Platform>(app: App<P>, api_key: ApiKey, timeout: Duration) -> Router {
    let state = ServerState { app };

    let public_routes = Router::new()
        .route("/health", get(handlers::health::<P>))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/resolve", get(handlers::resolve::<P>))
        .route("/download", get(handlers::download::<P>))
        .route("/media", get(handlers::media::<P>))
        .route("/correlate", get(handlers::correlate::<P>))
        .route_layer(middleware::from_fn_with_state(
            api_key,
            auth::require_api_key,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}

/// Serve until `shutdown` fires, then drain in-flight requests.
pub async fn serve<P: Platform>(
    config: &ServerConfig,
    app: App<P>,
    shutdown: ShutdownController,
) -> Result<()> {
    let api_key = ApiKey::new(config.api_key.clone());
    if !api_key.is_enabled() {
        log::warn!(
            "No API key configured; media endpoints are open to anyone who can reach {}",
            config.bind
        );
    }

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .context_bind(&config.bind)?;
    log::info!("HTTP server listening on {}", config.bind);

    axum::serve(listener, router(app, api_key))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    log::info!("HTTP server stopped");
    Ok(())
}
