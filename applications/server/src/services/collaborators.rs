//! Collaborator registry
//!
//! Owns the (playlist, user) role grants and answers "what may this user
//! do here". Only accepted rows grant a role; a pending invite grants
//! nothing until its invitee accepts it.

use super::{activity::ActivityRecorder, fetch_playlist};
use chorus_core::{
    ActivityEvent, ActivityType, ChorusError, Collaborator, CollaboratorId, Playlist, PlaylistId,
    Result, Role, UserDirectory, UserId,
};
use chorus_storage::collaborators;
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;

#[derive(Clone)]
pub struct CollaboratorRegistry {
    pool: SqlitePool,
    users: Arc<dyn UserDirectory>,
    activity: ActivityRecorder,
}

impl CollaboratorRegistry {
    pub fn new(pool: SqlitePool, users: Arc<dyn UserDirectory>, activity: ActivityRecorder) -> Self {
        Self {
            pool,
            users,
            activity,
        }
    }

    /// Effective role of `user_id`, or `None` when they hold no accepted grant
    pub async fn role_of(&self, playlist: &Playlist, user_id: &UserId) -> Result<Option<Role>> {
        if playlist.is_owned_by(user_id) {
            return Ok(Some(Role::Owner));
        }

        let row = collaborators::find_for_user(&self.pool, &playlist.id, user_id).await?;
        Ok(row.filter(Collaborator::is_accepted).map(|c| c.role))
    }

    /// Public playlists are visible to anyone; private ones need a role
    pub async fn can_view(&self, playlist: &Playlist, viewer: Option<&UserId>) -> Result<bool> {
        if playlist.is_public {
            return Ok(true);
        }
        match viewer {
            Some(user_id) => Ok(self.role_of(playlist, user_id).await?.is_some()),
            None => Ok(false),
        }
    }

    /// Fail with Forbidden unless `viewer` may read `playlist`
    pub async fn ensure_can_view(&self, playlist: &Playlist, viewer: Option<&UserId>) -> Result<()> {
        if self.can_view(playlist, viewer).await? {
            Ok(())
        } else {
            Err(ChorusError::forbidden("You do not have access to this playlist"))
        }
    }

    /// Create the accepted owner row unless one already exists
    pub async fn ensure_owner(
        conn: &mut SqliteConnection,
        playlist_id: &PlaylistId,
        owner_id: &UserId,
    ) -> Result<()> {
        collaborators::ensure_owner(conn, playlist_id, owner_id).await
    }

    /// Owner sees every row; other viewers see accepted rows only
    pub async fn list(&self, playlist_id: &PlaylistId, viewer: &UserId) -> Result<Vec<Collaborator>> {
        let playlist = fetch_playlist(&self.pool, playlist_id).await?;
        self.ensure_can_view(&playlist, Some(viewer)).await?;

        let accepted_only = !playlist.is_owned_by(viewer);
        collaborators::list(&self.pool, playlist_id, accepted_only).await
    }

    /// Invite a user by username, or by email when the identifier has an `@`
    pub async fn invite(
        &self,
        playlist_id: &PlaylistId,
        actor: &UserId,
        identifier: &str,
        role: Option<Role>,
    ) -> Result<Collaborator> {
        let playlist = fetch_playlist(&self.pool, playlist_id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("Only owners can invite collaborators"));
        }

        let role = role.unwrap_or(Role::Viewer);
        if role == Role::Owner {
            return Err(ChorusError::bad_request("Cannot assign owner role via invite"));
        }

        let identifier = identifier.trim();
        let invited = if identifier.contains('@') {
            self.users.find_by_email(identifier).await?
        } else {
            self.users.find_by_username(identifier).await?
        }
        .ok_or_else(|| ChorusError::not_found("User", identifier))?;

        if playlist.is_owned_by(&invited.id) {
            return Err(ChorusError::bad_request("Owner is already a collaborator"));
        }

        let collaborator =
            match collaborators::find_for_user(&self.pool, playlist_id, &invited.id).await? {
                Some(existing) if existing.is_accepted() => {
                    return Err(ChorusError::bad_request("User is already a collaborator"));
                }
                Some(mut existing) => {
                    existing.reinvite(role);
                    collaborators::save(&self.pool, &existing).await?;
                    existing
                }
                None => {
                    let fresh = Collaborator::invite(playlist_id.clone(), invited.id.clone(), role);
                    collaborators::insert(&self.pool, &fresh).await?;
                    fresh
                }
            };

        tracing::info!(
            "User {} invited to playlist {} as {}",
            invited.id,
            playlist_id,
            role
        );

        self.activity
            .record(ActivityEvent::playlist(
                actor.clone(),
                ActivityType::PlaylistCollaboratorInvited,
                playlist_id,
                json!({ "invited_user_id": invited.id, "role": role }),
            ))
            .await;

        Ok(collaborator)
    }

    /// Accept one's own invite; accepting twice is a no-op
    pub async fn accept(
        &self,
        playlist_id: &PlaylistId,
        collaborator_id: &CollaboratorId,
        actor: &UserId,
    ) -> Result<Collaborator> {
        let mut collaborator = self.invite_for(playlist_id, collaborator_id, actor).await?;
        if !collaborator.accept() {
            return Ok(collaborator);
        }

        collaborators::save(&self.pool, &collaborator).await?;

        self.activity
            .record(ActivityEvent::playlist(
                actor.clone(),
                ActivityType::PlaylistCollaboratorAccepted,
                playlist_id,
                json!({ "collaborator_id": collaborator.id, "role": collaborator.role }),
            ))
            .await;

        Ok(collaborator)
    }

    /// Decline one's own invite, deleting the row
    pub async fn reject(
        &self,
        playlist_id: &PlaylistId,
        collaborator_id: &CollaboratorId,
        actor: &UserId,
    ) -> Result<()> {
        let collaborator = self.invite_for(playlist_id, collaborator_id, actor).await?;
        if collaborator.is_owner() {
            return Err(ChorusError::bad_request("Cannot remove the owner"));
        }

        collaborators::delete(&self.pool, &collaborator.id).await?;

        self.activity
            .record(ActivityEvent::playlist(
                actor.clone(),
                ActivityType::PlaylistCollaboratorRejected,
                playlist_id,
                json!({ "collaborator_id": collaborator.id, "role": collaborator.role }),
            ))
            .await;

        Ok(())
    }

    pub async fn update_role(
        &self,
        playlist_id: &PlaylistId,
        collaborator_id: &CollaboratorId,
        actor: &UserId,
        role: Role,
    ) -> Result<Collaborator> {
        let playlist = fetch_playlist(&self.pool, playlist_id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("Only owners can update collaborator roles"));
        }
        if role == Role::Owner {
            return Err(ChorusError::bad_request("Cannot assign owner role"));
        }

        let mut collaborator = collaborators::get_by_id(&self.pool, playlist_id, collaborator_id)
            .await?
            .ok_or_else(|| ChorusError::not_found("Collaborator", collaborator_id))?;
        if collaborator.is_owner() {
            return Err(ChorusError::bad_request("Cannot update owner role"));
        }

        collaborator.role = role;
        collaborators::save(&self.pool, &collaborator).await?;

        self.activity
            .record(ActivityEvent::playlist(
                actor.clone(),
                ActivityType::PlaylistCollaboratorRoleUpdated,
                playlist_id,
                json!({ "collaborator_id": collaborator.id, "role": role }),
            ))
            .await;

        Ok(collaborator)
    }

    pub async fn remove(
        &self,
        playlist_id: &PlaylistId,
        collaborator_id: &CollaboratorId,
        actor: &UserId,
    ) -> Result<()> {
        let playlist = fetch_playlist(&self.pool, playlist_id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("Only owners can remove collaborators"));
        }

        let collaborator = collaborators::get_by_id(&self.pool, playlist_id, collaborator_id)
            .await?
            .ok_or_else(|| ChorusError::not_found("Collaborator", collaborator_id))?;
        if collaborator.is_owner() {
            return Err(ChorusError::bad_request("Cannot remove the owner"));
        }

        collaborators::delete(&self.pool, &collaborator.id).await?;

        tracing::info!(
            "Collaborator {} removed from playlist {}",
            collaborator.user_id,
            playlist_id
        );

        self.activity
            .record(ActivityEvent::playlist(
                actor.clone(),
                ActivityType::PlaylistCollaboratorRemoved,
                playlist_id,
                json!({ "collaborator_id": collaborator.id, "role": collaborator.role }),
            ))
            .await;

        Ok(())
    }

    async fn invite_for(
        &self,
        playlist_id: &PlaylistId,
        collaborator_id: &CollaboratorId,
        actor: &UserId,
    ) -> Result<Collaborator> {
        let collaborator = collaborators::get_by_id(&self.pool, playlist_id, collaborator_id)
            .await?
            .ok_or_else(|| ChorusError::not_found("Collaborator invite", collaborator_id))?;

        if &collaborator.user_id != actor {
            return Err(ChorusError::forbidden("You cannot respond to this invite"));
        }

        Ok(collaborator)
    }
}
