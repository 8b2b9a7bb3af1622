/// Playlists API routes
use crate::{
    error::Result,
    middleware::{AuthenticatedUser, MaybeUser},
    services::playlists::NewPlaylist,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chorus_core::{
    types::{AddTrack, DuplicatePlaylist, ShareInfo, TrackPosition, UpdatePlaylist},
    Activity, MutationOutcome, Page, PageRequest, Playlist, PlaylistId, TrackId, UserId,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub is_public: Option<bool>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderTracksRequest {
    pub tracks: Vec<TrackPosition>,
}

/// 200 with the playlist when applied, 202 with the change request when pending
pub(crate) fn outcome_response(outcome: MutationOutcome) -> Response {
    let status = if outcome.is_pending() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    (status, Json(outcome)).into_response()
}

/// GET /api/playlists
/// Playlists the caller owns or collaborates on
pub async fn list_playlists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Playlist>>> {
    let page = app_state
        .playlists
        .list_mine(auth.user_id(), query.is_public, query.page_request())
        .await?;
    Ok(Json(page))
}

/// GET /api/playlists/public
pub async fn list_public_playlists(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Playlist>>> {
    let page = app_state
        .playlists
        .list_public(query.page_request())
        .await?;
    Ok(Json(page))
}

/// GET /api/playlists/user/:user_id
pub async fn list_user_playlists(
    Path(user_id): Path<UserId>,
    State(app_state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Playlist>>> {
    let page = app_state
        .playlists
        .list_for_user(&user_id, viewer.user_id(), query.page_request())
        .await?;
    Ok(Json(page))
}

/// POST /api/playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<NewPlaylist>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let playlist = app_state.playlists.create(auth.user_id(), req).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists/:id
/// Playlist with tracks; public playlists need no token
pub async fn get_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    viewer: MaybeUser,
) -> Result<Json<Playlist>> {
    let playlist = app_state.playlists.get(&id, viewer.user_id()).await?;
    Ok(Json(playlist))
}

/// PATCH /api/playlists/:id
pub async fn update_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<UpdatePlaylist>,
) -> Result<Json<Playlist>> {
    let playlist = app_state
        .playlists
        .update(&id, auth.user_id(), req)
        .await?;
    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    app_state.playlists.delete(&id, auth.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/playlists/:id/activities
pub async fn list_activities(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Activity>>> {
    let page = app_state
        .playlists
        .activities(&id, viewer.user_id(), query.page_request())
        .await?;
    Ok(Json(page))
}

/// POST /api/playlists/:id/tracks
pub async fn add_track(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<AddTrack>,
) -> Result<Response> {
    let outcome = app_state
        .playlists
        .add_track(&id, auth.user_id(), req)
        .await?;
    Ok(outcome_response(outcome))
}

/// DELETE /api/playlists/:id/tracks/:track_id
pub async fn remove_track(
    Path((id, track_id)): Path<(PlaylistId, TrackId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Response> {
    let outcome = app_state
        .playlists
        .remove_track(&id, auth.user_id(), track_id)
        .await?;
    Ok(outcome_response(outcome))
}

/// PATCH /api/playlists/:id/tracks/reorder
pub async fn reorder_tracks(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<ReorderTracksRequest>,
) -> Result<Response> {
    let outcome = app_state
        .playlists
        .reorder_tracks(&id, auth.user_id(), req.tracks)
        .await?;
    Ok(outcome_response(outcome))
}

/// POST /api/playlists/:id/duplicate
pub async fn duplicate_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    body: Option<Json<DuplicatePlaylist>>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let overrides = body.map(|Json(overrides)| overrides).unwrap_or_default();
    let playlist = app_state
        .playlists
        .duplicate(&id, auth.user_id(), overrides)
        .await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// POST /api/playlists/:id/share
pub async fn share_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<ShareInfo>> {
    let info = app_state.playlists.share(&id, auth.user_id()).await?;
    Ok(Json(info))
}
