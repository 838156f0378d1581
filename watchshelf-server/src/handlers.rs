use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use watchshelf_core::{
    ImportErrorKind, ImportResult, LibraryInfo, ListStatus, PlaceholderRecord, PlaybackItem,
};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    /// Overrides the configured list status for this run.
    pub status: Option<String>,
}

/// Run an import and wait for it to finish.
pub async fn import_handler(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
) -> Response {
    let mut settings = (*state.settings).clone();
    if let Some(raw) = query.status.as_deref() {
        settings.list_status = ListStatus::parse_lenient(raw);
    }

    info!(list_status = %settings.list_status, "Import requested over HTTP");
    let result = state.orchestrator.import_plan_to_watch(&settings).await;

    let status = import_status(&result);
    (status, Json(result)).into_response()
}

fn import_status(result: &ImportResult) -> StatusCode {
    if result.success || result.error.is_none() {
        return StatusCode::OK;
    }
    match result.error_kind {
        Some(ImportErrorKind::InvalidToken) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_REQUEST,
    }
}

pub async fn libraries_handler(State(state): State<AppState>) -> AppResult<Json<Vec<LibraryInfo>>> {
    let libraries = state.orchestrator.host().list_configured_libraries().await?;
    Ok(Json(libraries))
}

#[derive(Debug, Serialize)]
pub struct ScrobbleResponse {
    pub success: bool,
    pub item: PlaybackItem,
}

pub async fn scrobble_handler(
    State(state): State<AppState>,
    Json(item): Json<PlaybackItem>,
) -> AppResult<Json<ScrobbleResponse>> {
    let Some(token) = state.orchestrator.tokens().current().await else {
        warn!(path = %item.path.display(), "Scrobble without a user token");
        return Err(AppError::unauthorized("No Simkl user token configured"));
    };

    let (success, item) = state.reconciler.reconcile_scrobble(item, &token).await?;
    Ok(Json(ScrobbleResponse { success, item }))
}

pub async fn placeholders_handler(State(state): State<AppState>) -> Json<Vec<PlaceholderRecord>> {
    Json(state.orchestrator.ledger().list().await)
}

pub async fn health_handler() -> &'static str {
    "ok"
}
