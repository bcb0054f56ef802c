//! Settings API endpoints - JSON API

use axum::extract::State;
use axum::Json;
use debtweb_config::Config;

use crate::AppState;

pub async fn api_settings(State(state): State<AppState>) -> Json<Config> {
    Json(state.config.clone())
}
