//! Web surface: the single-page chat UI and the JSON endpoints behind it.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use eyre::{Result, WrapErr};
use log::{info, warn};

use crate::app::App;

pub mod handlers;
pub mod sessions;

use sessions::Sessions;

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
    pub sessions: Arc<Sessions>,
}

impl AppState {
    pub fn new(app: App) -> Self {
        Self {
            app: Arc::new(app),
            sessions: Arc::new(Sessions::default()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/settings", get(handlers::settings))
        .route("/api/load", post(handlers::load))
        .route("/api/ask", post(handlers::ask))
        .route("/api/style", get(handlers::style))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
}

/// Bind and serve until Ctrl+C
pub async fn serve(app: App) -> Result<()> {
    let host = app.config().host.clone();
    let port = app.config().port;

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .wrap_err_with(|| format!("binding to {host}:{port}"))?;
    let addr = listener.local_addr()?;

    println!("\n{}", "=".repeat(40));
    println!("Open the app at: http://{addr}");
    println!("{}\n", "=".repeat(40));
    info!("Listening on http://{addr}");

    axum::serve(listener, router(AppState::new(app)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("running web server")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {e}");
    }
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let resp = next.run(req).await;
    info!("{method} {path} -> {} in {:?}", resp.status(), started.elapsed());
    resp
}
