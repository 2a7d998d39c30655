//! Backend for the restaurant battle app.
//!
//! Clients open a session against a geolocation and swipe through nearby
//! restaurants two at a time. The interesting part lives in [`battle`]: each
//! session pages through the upstream places API with a cursor over an
//! append-only result list, and a background task tops the list up before
//! the reader catches the fetched frontier.
//!
//!
//!
//! # General Infrastructure
//! - One process, in-memory sessions; a session dies on reset or restart
//! - All upstream traffic goes through the `places` crate so the API key
//!   never reaches a client
//! - Auth, favorites, and playlists live in a separate service in front of
//!   the relational store; this server only speaks the session/battle surface
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Run locally (needs `GOOGLE_API_KEY` in the environment or under
//! `/run/secrets`).
//! ```sh
//! RUST_LOG=info cargo run -p server
//! ```

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod battle;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod utils;

use routes::{
    details_handler, nearby_handler, next_handler, photo_handler, reset_handler, search_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/nearby-restaurants", get(nearby_handler))
        .route("/api/next-restaurant", post(next_handler))
        .route("/api/reset-session", post(reset_handler))
        .route("/api/photo", get(photo_handler))
        .route("/api/search-restaurants", get(search_handler))
        .route("/api/restaurant-details", get(details_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new();

    info!("Starting server...");
    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
