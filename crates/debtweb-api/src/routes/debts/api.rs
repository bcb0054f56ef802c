//! Debt API endpoints - JSON API
//!
//! Endpoints:
//! - api_debts: All stored debts with overrides applied (JSON)
//! - api_debt_detail: Single debt (JSON)
//! - api_import_debts: Import a workbook into the store (JSON)
//! - api_set_status: Mark a debt as paid or pending (JSON)

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use debtweb_config::MergeMode;
use debtweb_core::{CoreError, ImportSummary, StoredDebt};
use debtweb_importer::DebtStatus;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path as FsPath, PathBuf};

use crate::{ApiError, AppState};

/// Body of an import request; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    /// Workbook to read, relative to the data directory
    pub path: Option<PathBuf>,
    pub mode: Option<MergeMode>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub id: String,
    pub status: DebtStatus,
}

/// An empty body reads as the default value
fn json_body<T: Default + serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest {
        message: format!("invalid JSON body: {}", e),
    })
}

/// Only plain relative paths are accepted, so imports stay inside the data directory
fn data_relative(path: &FsPath) -> Result<&FsPath, ApiError> {
    let plain = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !plain || path.as_os_str().is_empty() {
        return Err(ApiError::BadRequest {
            message: format!("path must be relative to the data directory: {}", path.display()),
        });
    }
    Ok(path)
}

/// Get all debts (JSON API)
pub async fn api_debts(State(state): State<AppState>) -> Json<Vec<StoredDebt>> {
    let book = state.book.read().await;
    Json(book.debts())
}

/// Get a single debt (JSON API)
pub async fn api_debt_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredDebt>, ApiError> {
    let book = state.book.read().await;
    book.debt(&id)
        .map(Json)
        .ok_or_else(|| CoreError::DebtNotFound { id }.into())
}

/// Import a workbook (JSON API)
pub async fn api_import_debts(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportSummary>, ApiError> {
    let request: ImportRequest = json_body(&body)?;

    let path = match &request.path {
        Some(p) => state.config.data.path.join(data_relative(p)?),
        None => state.config.workbook_path(),
    };
    let mode = request.mode.unwrap_or(state.config.import.default_mode);

    log::info!("Importing {} ({})", path.display(), mode);
    let records = state
        .importer
        .import_file(path)
        .await
        .map_err(CoreError::from)?;

    let mut book = state.book.write().await;
    let summary = book.import(records, mode)?;
    Ok(Json(summary))
}

/// Set the status of a debt (JSON API)
pub async fn api_set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let request: StatusRequest = match json_body::<Option<StatusRequest>>(&body)? {
        Some(request) => request,
        None => StatusRequest { status: None },
    };

    let status: DebtStatus = request
        .status
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest {
            message: "Missing id or status".to_string(),
        })?
        .parse()
        .map_err(|message| ApiError::BadRequest { message })?;

    let mut book = state.book.write().await;
    let debt = book.set_status(&id, status)?;

    Ok(Json(StatusResponse {
        message: "Status updated".to_string(),
        id: debt.id,
        status: debt.status,
    }))
}
