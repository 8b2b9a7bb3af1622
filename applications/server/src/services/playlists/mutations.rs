//! Membership mutations
//!
//! Every attempt runs the same gate: resolve the actor's role, refuse
//! viewers and smart playlists, check feasibility, then either record a
//! change request or apply the change in one transaction. Activities are
//! recorded only after commit.

use super::PlaylistService;
use crate::services::fetch_playlist;
use chorus_core::{
    types::{AddTrack, TrackPosition},
    ActivityEvent, ActivityType, ChangeProposal, ChangeRequest, ChorusError, MutationOutcome,
    Playlist, PlaylistId, Result, Role, TrackId, UserId,
};
use chorus_storage::{change_requests, playlists::membership, smart_playlists};
use serde_json::json;
use sqlx::SqliteConnection;
use std::collections::HashSet;

impl PlaylistService {
    pub async fn add_track(
        &self,
        id: &PlaylistId,
        actor: &UserId,
        request: AddTrack,
    ) -> Result<MutationOutcome> {
        let proposal = ChangeProposal::AddTrack {
            track_id: request.track_id,
            position: request.position,
        };
        self.mutate(id, actor, proposal).await
    }

    pub async fn remove_track(
        &self,
        id: &PlaylistId,
        actor: &UserId,
        track_id: TrackId,
    ) -> Result<MutationOutcome> {
        self.mutate(id, actor, ChangeProposal::RemoveTrack { track_id })
            .await
    }

    pub async fn reorder_tracks(
        &self,
        id: &PlaylistId,
        actor: &UserId,
        tracks: Vec<TrackPosition>,
    ) -> Result<MutationOutcome> {
        self.mutate(id, actor, ChangeProposal::ReorderTracks { tracks })
            .await
    }

    async fn mutate(
        &self,
        id: &PlaylistId,
        actor: &UserId,
        proposal: ChangeProposal,
    ) -> Result<MutationOutcome> {
        let playlist = fetch_playlist(&self.pool, id).await?;
        let role = self.authorize_edit(&playlist, actor).await?;

        self.check_feasible(&playlist.id, &proposal).await?;

        if playlist.approval_required && role != Role::Owner {
            let request = self.request_change(&playlist.id, actor, proposal).await?;
            return Ok(MutationOutcome::Pending(request));
        }

        let mut tx = self.pool.begin().await?;
        let event = self.apply(&mut tx, &playlist.id, &proposal, actor).await?;
        tx.commit().await?;

        if let Some(event) = event {
            self.activity.record(event).await;
        }

        Ok(MutationOutcome::Applied(self.view(&playlist.id).await?))
    }

    /// Role that permits editing, or Forbidden
    async fn authorize_edit(&self, playlist: &Playlist, actor: &UserId) -> Result<Role> {
        let role = self
            .registry
            .role_of(playlist, actor)
            .await?
            .ok_or_else(|| ChorusError::forbidden("You do not have access to modify this playlist"))?;

        if !role.can_edit() {
            return Err(ChorusError::forbidden(
                "You do not have permission to edit this playlist",
            ));
        }

        if smart_playlists::exists_for_playlist(&self.pool, &playlist.id).await? {
            return Err(ChorusError::forbidden("Smart playlists cannot be manually edited"));
        }

        Ok(role)
    }

    /// Reject proposals that could not be applied against current state
    async fn check_feasible(&self, playlist_id: &PlaylistId, proposal: &ChangeProposal) -> Result<()> {
        match proposal {
            ChangeProposal::AddTrack { track_id, .. } => {
                if self.catalog.find_track(track_id).await?.is_none() {
                    return Err(ChorusError::not_found("Track", track_id));
                }
                if membership::position_of(&self.pool, playlist_id, track_id)
                    .await?
                    .is_some()
                {
                    return Err(ChorusError::bad_request("Track is already in this playlist"));
                }
            }
            ChangeProposal::RemoveTrack { track_id } => {
                if membership::position_of(&self.pool, playlist_id, track_id)
                    .await?
                    .is_none()
                {
                    return Err(not_in_playlist(track_id));
                }
            }
            ChangeProposal::ReorderTracks { tracks } => {
                let members: HashSet<TrackId> = membership::track_ids(&self.pool, playlist_id)
                    .await?
                    .into_iter()
                    .collect();
                let mut seen = HashSet::new();
                for entry in tracks {
                    if !members.contains(&entry.track_id) || !seen.insert(&entry.track_id) {
                        return Err(ChorusError::bad_request(
                            "Some tracks are not in this playlist",
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    async fn request_change(
        &self,
        playlist_id: &PlaylistId,
        actor: &UserId,
        proposal: ChangeProposal,
    ) -> Result<ChangeRequest> {
        let request = ChangeRequest::new(playlist_id.clone(), actor.clone(), proposal);
        change_requests::insert(&self.pool, &request).await?;

        tracing::info!(
            "Change request {} ({}) created on playlist {} by user {}",
            request.id,
            request.proposal.action(),
            playlist_id,
            actor
        );

        self.activity
            .record(ActivityEvent::playlist(
                actor.clone(),
                ActivityType::PlaylistChangeRequested,
                playlist_id,
                json!({
                    "change_request_id": request.id,
                    "action": request.proposal.action(),
                    "payload": request.proposal.payload(),
                }),
            ))
            .await;

        Ok(request)
    }

    /// Apply a proposal on `conn`, returning the activity to record after
    /// commit. `actor` is credited with the change.
    pub(super) async fn apply(
        &self,
        conn: &mut SqliteConnection,
        playlist_id: &PlaylistId,
        proposal: &ChangeProposal,
        actor: &UserId,
    ) -> Result<Option<ActivityEvent>> {
        match proposal {
            ChangeProposal::AddTrack { track_id, position } => {
                let track = self
                    .catalog
                    .find_track(track_id)
                    .await?
                    .ok_or_else(|| ChorusError::not_found("Track", track_id))?;

                if membership::position_of(&mut *conn, playlist_id, track_id)
                    .await?
                    .is_some()
                {
                    return Err(ChorusError::bad_request("Track is already in this playlist"));
                }

                let stored = membership::insert_track(conn, playlist_id, track_id, *position).await?;

                tracing::info!(
                    "Track {} added to playlist {} at position {}",
                    track_id,
                    playlist_id,
                    stored
                );

                Ok(Some(ActivityEvent::playlist(
                    actor.clone(),
                    ActivityType::PlaylistTrackAdded,
                    playlist_id,
                    json!({
                        "track_id": track_id,
                        "track_title": track.title,
                        "position": stored,
                    }),
                )))
            }
            ChangeProposal::RemoveTrack { track_id } => {
                let title = self.catalog.find_track(track_id).await?.map(|t| t.title);

                membership::remove_track(conn, playlist_id, track_id)
                    .await?
                    .ok_or_else(|| not_in_playlist(track_id))?;

                tracing::info!("Track {} removed from playlist {}", track_id, playlist_id);

                Ok(Some(ActivityEvent::playlist(
                    actor.clone(),
                    ActivityType::PlaylistTrackRemoved,
                    playlist_id,
                    json!({ "track_id": track_id, "track_title": title }),
                )))
            }
            ChangeProposal::ReorderTracks { tracks } => {
                membership::set_positions(conn, playlist_id, tracks).await?;
                tracing::info!("Tracks reordered in playlist {}", playlist_id);
                Ok(None)
            }
        }
    }
}

fn not_in_playlist(track_id: &TrackId) -> ChorusError {
    ChorusError::not_found("Playlist track", track_id)
}
