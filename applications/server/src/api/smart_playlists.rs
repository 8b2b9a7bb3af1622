/// Smart playlist API routes
use crate::{
    error::Result, middleware::AuthenticatedUser, services::RefreshSummary, state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use chorus_core::{types::CreateSmartPlaylist, Playlist, Track};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub criteria: Value,
}

/// POST /api/playlists/smart/preview
/// Resolve criteria without saving anything
pub async fn preview(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<Vec<Track>>> {
    let tracks = app_state
        .smart_playlists
        .preview(auth.user_id(), &req.criteria)
        .await?;
    Ok(Json(tracks))
}

/// POST /api/playlists/smart
pub async fn create_smart_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CreateSmartPlaylist>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let playlist = app_state
        .smart_playlists
        .create(auth.user_id(), req)
        .await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// POST /api/playlists/smart/refresh
pub async fn refresh_all(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
) -> Result<Json<RefreshSummary>> {
    let summary = app_state.smart_playlists.refresh_all().await?;
    Ok(Json(summary))
}
