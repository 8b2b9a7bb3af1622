/// Playlist collaborator API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chorus_core::{Collaborator, CollaboratorId, PlaylistId, Role};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    /// Username, or email when it contains `@`
    pub identifier: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// GET /api/playlists/:id/collaborators
pub async fn list_collaborators(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<Collaborator>>> {
    let collaborators = app_state.collaborators.list(&id, auth.user_id()).await?;
    Ok(Json(collaborators))
}

/// POST /api/playlists/:id/collaborators
pub async fn invite_collaborator(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<InviteRequest>,
) -> Result<(StatusCode, Json<Collaborator>)> {
    let collaborator = app_state
        .collaborators
        .invite(&id, auth.user_id(), &req.identifier, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(collaborator)))
}

/// POST /api/playlists/:id/collaborators/:cid/accept
pub async fn accept_invite(
    Path((id, collaborator_id)): Path<(PlaylistId, CollaboratorId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Collaborator>> {
    let collaborator = app_state
        .collaborators
        .accept(&id, &collaborator_id, auth.user_id())
        .await?;
    Ok(Json(collaborator))
}

/// POST /api/playlists/:id/collaborators/:cid/reject
pub async fn reject_invite(
    Path((id, collaborator_id)): Path<(PlaylistId, CollaboratorId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    app_state
        .collaborators
        .reject(&id, &collaborator_id, auth.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/playlists/:id/collaborators/:cid
pub async fn update_role(
    Path((id, collaborator_id)): Path<(PlaylistId, CollaboratorId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<Collaborator>> {
    let collaborator = app_state
        .collaborators
        .update_role(&id, &collaborator_id, auth.user_id(), req.role)
        .await?;
    Ok(Json(collaborator))
}

/// DELETE /api/playlists/:id/collaborators/:cid
pub async fn remove_collaborator(
    Path((id, collaborator_id)): Path<(PlaylistId, CollaboratorId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    app_state
        .collaborators
        .remove(&id, &collaborator_id, auth.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
