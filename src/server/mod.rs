//! JSON API server

pub mod auth;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::content::{Post, PostLoader, PreviewSummary};
use crate::BlogApi;

/// Server state
#[derive(Clone)]
struct ServerState {
    loader: PostLoader,
    default_locale: Arc<str>,
}

impl ServerState {
    /// Requested locale, or the default when absent or blank
    fn locale(&self, query: LocaleQuery) -> String {
        query
            .locale
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.default_locale.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

/// Build the API router; every route sits behind the access gate
pub fn router(api: &BlogApi) -> Router {
    let state = ServerState {
        loader: api.loader.clone(),
        default_locale: Arc::from(api.config.default_locale.as_str()),
    };

    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:slug", get(get_post))
        .layer(middleware::from_fn_with_state(
            api.gate.clone(),
            auth::require_secret,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start serving the API
pub async fn start(api: &BlogApi, ip: &str, port: u16) -> Result<()> {
    let app = router(api);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Serving posts from {} on http://{}", api.source_name(), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// GET /posts
async fn list_posts(
    State(state): State<ServerState>,
    Query(query): Query<LocaleQuery>,
) -> crate::Result<Json<Vec<PreviewSummary>>> {
    let locale = state.locale(query);
    let previews = state.loader.list_previews(&locale).await?;
    Ok(Json(previews))
}

/// GET /posts/:slug
async fn get_post(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> crate::Result<Json<Post>> {
    let locale = state.locale(query);
    let post = state.loader.fetch_post(&slug, &locale).await?;
    Ok(Json(post))
}
