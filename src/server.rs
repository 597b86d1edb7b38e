//! HTTP server for the listing page.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::listing::ListingResolver;
use crate::render::render_listing;

/// Shared, read-only request state
pub struct AppState {
    pub resolver: ListingResolver,
}

/// First `query` value of the listing page's query string.
///
/// Repeated or unrelated parameters are ignored so the page always renders.
fn search_param(params: Vec<(String, String)>) -> Option<String> {
    params
        .into_iter()
        .find_map(|(name, value)| (name == "query").then_some(value))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(listing_handler))
        .route("/healthz", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn listing_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let cookie = headers.get(COOKIE).and_then(|v| v.to_str().ok());
    let query = search_param(params);

    let model = state.resolver.resolve(query.as_deref(), cookie).await;

    match render_listing(&model) {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            error!("Failed to render listing page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Serve the listing page on `bind` until Ctrl+C or SIGTERM.
pub async fn serve(bind: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    info!("Binding to {}", bind);
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Server running on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
