//! HTTP JSON API for the debt tracker
//!
//! Routes are organized into modules:
//! - routes::debts: Debt list, workbook import, status overrides
//! - routes::settings: Configuration display

pub mod error;
pub mod routes;

use axum::{
    http::Uri,
    routing::{get, post},
    Json, Router,
};
use debtweb_config::Config;
use debtweb_core::DebtBook;
use debtweb_importer::ImporterRef;
use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub book: Arc<RwLock<DebtBook>>,
    pub importer: ImporterRef,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::debts::{api_debt_detail, api_debts, api_import_debts, api_set_status};
    use routes::settings::api_settings;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/debts", get(api_debts))
        .route("/api/debts/import", post(api_import_debts))
        .route("/api/debts/:id", get(api_debt_detail))
        .route("/api/debts/:id/status", post(api_set_status))
        .route("/api/settings", get(api_settings))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "message": "Server is running" }))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: uri.path().to_string(),
    }
}

/// Start the HTTP server and serve until Ctrl+C
pub async fn start_server(
    config: Config,
    book: Arc<RwLock<DebtBook>>,
    importer: ImporterRef,
) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { book, importer, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Starting debtweb server on http://{}", addr);
    info!("Available routes:");
    info!("  - GET  /api/health");
    info!("  - GET  /api/debts");
    info!("  - POST /api/debts/import");
    info!("  - GET  /api/debts/:id");
    info!("  - POST /api/debts/:id/status");
    info!("  - GET  /api/settings");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

// ==================== Tests ====================
