/// Change request API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chorus_core::{ChangeRequest, ChangeRequestId, ChangeStatus, Playlist, PlaylistId};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ChangeRequestQuery {
    pub status: Option<ChangeStatus>,
}

/// GET /api/playlists/:id/change-requests?status=
pub async fn list_change_requests(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<ChangeRequestQuery>,
) -> Result<Json<Vec<ChangeRequest>>> {
    let requests = app_state
        .playlists
        .list_change_requests(&id, auth.user_id(), query.status)
        .await?;
    Ok(Json(requests))
}

/// POST /api/playlists/:id/change-requests/:rid/approve
pub async fn approve_change_request(
    Path((id, request_id)): Path<(PlaylistId, ChangeRequestId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Playlist>> {
    let playlist = app_state
        .playlists
        .approve_change_request(&id, &request_id, auth.user_id())
        .await?;
    Ok(Json(playlist))
}

/// POST /api/playlists/:id/change-requests/:rid/reject
pub async fn reject_change_request(
    Path((id, request_id)): Path<(PlaylistId, ChangeRequestId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<ChangeRequest>> {
    let request = app_state
        .playlists
        .reject_change_request(&id, &request_id, auth.user_id())
        .await?;
    Ok(Json(request))
}
