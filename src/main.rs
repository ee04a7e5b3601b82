//! Snake Duel WebSocket Server
//!
//! Two-player room-based snake over WebSocket.

use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::Parser;
use rust_embed::Embed;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snake_duel::config::ServerConfig;
use snake_duel::game::game_loop::spawn_broadcast_loop;
use snake_duel::health::health_handler;
use snake_duel::ws::ws_handler;
use snake_duel::{AppState, GameError};

/// Embedded static files
#[derive(Embed)]
#[folder = "static/"]
struct Assets;

/// Serve embedded static files
async fn serve_static(path: &str) -> impl IntoResponse {
    let path = if path.is_empty() { "index.html" } else { path };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Index page handler
async fn index_handler() -> impl IntoResponse {
    serve_static("index.html").await
}

/// Static file handler
async fn static_handler(Path(path): Path<String>) -> impl IntoResponse {
    serve_static(&path).await
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), GameError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snake_duel=debug,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::parse();
    let settings = config.game_settings();

    let state = Arc::new(AppState::new(settings).with_environment(config.environment.clone()));

    let broadcast_loop = spawn_broadcast_loop(
        state.registry.clone(),
        state.broadcaster.clone(),
        settings.broadcast_interval,
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/{*path}", get(static_handler))
        .layer(cors)
        .with_state(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Snake server running on http://{}", addr);
    info!("   WebSocket endpoint: ws://{}/ws", addr);
    info!(
        "   Grid {}x{}, tick {}ms, broadcast {}ms ({})",
        settings.grid.width,
        settings.grid.height,
        settings.tick_interval.as_millis(),
        settings.broadcast_interval.as_millis(),
        config.environment
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    broadcast_loop.abort();
    info!("Server shut down");

    Ok(())
}
