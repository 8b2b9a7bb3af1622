//! Playlist service
//!
//! CRUD, listing and sharing live here. Membership mutations are in
//! [`mutations`] and the approval ledger in [`change_requests`]; both
//! extend [`PlaylistService`].

mod change_requests;
mod mutations;

use super::{activity::ActivityRecorder, collaborators::CollaboratorRegistry, fetch_playlist};
use chorus_core::{
    types::{CreatePlaylist, DuplicatePlaylist, ShareInfo, UpdatePlaylist},
    Activity, ChorusError, EntityType, Page, PageRequest, Playlist, PlaylistId, Result,
    TrackCatalog, UserId,
};
use chorus_storage::{activities, playlists};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Body of a create-playlist request; the owner comes from the token
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub approval_required: bool,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Clone)]
pub struct PlaylistService {
    pool: SqlitePool,
    catalog: Arc<dyn TrackCatalog>,
    registry: CollaboratorRegistry,
    activity: ActivityRecorder,
}

impl PlaylistService {
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn TrackCatalog>,
        registry: CollaboratorRegistry,
        activity: ActivityRecorder,
    ) -> Self {
        Self {
            pool,
            catalog,
            registry,
            activity,
        }
    }

    /// Create a playlist together with its owner collaborator row
    pub async fn create(&self, owner: &UserId, input: NewPlaylist) -> Result<Playlist> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ChorusError::bad_request("Playlist name is required"));
        }

        let request = CreatePlaylist {
            owner_id: owner.clone(),
            name: name.to_string(),
            description: input.description,
            is_public: input.is_public,
            approval_required: input.approval_required,
            cover_image: input.cover_image,
        };

        let mut tx = self.pool.begin().await?;
        let playlist = playlists::create(&mut *tx, &request).await?;
        CollaboratorRegistry::ensure_owner(&mut tx, &playlist.id, owner).await?;
        tx.commit().await?;

        tracing::info!("Playlist created: {} by user {}", playlist.id, owner);

        self.view(&playlist.id).await
    }

    /// Playlist with ordered tracks, if `viewer` may see it
    pub async fn get(&self, id: &PlaylistId, viewer: Option<&UserId>) -> Result<Playlist> {
        let playlist = self.view(id).await?;
        self.registry.ensure_can_view(&playlist, viewer).await?;
        Ok(playlist)
    }

    pub async fn update(
        &self,
        id: &PlaylistId,
        actor: &UserId,
        mut changes: UpdatePlaylist,
    ) -> Result<Playlist> {
        let playlist = fetch_playlist(&self.pool, id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("You can only update your own playlists"));
        }

        if let Some(name) = changes.name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(ChorusError::bad_request("Playlist name cannot be empty"));
            }
            changes.name = Some(name.to_string());
        }

        playlists::update(&self.pool, id, &changes).await?;
        tracing::info!("Playlist updated: {}", id);

        self.view(id).await
    }

    pub async fn delete(&self, id: &PlaylistId, actor: &UserId) -> Result<()> {
        let playlist = fetch_playlist(&self.pool, id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("You can only delete your own playlists"));
        }

        playlists::delete(&self.pool, id).await?;
        tracing::info!("Playlist deleted: {}", id);

        Ok(())
    }

    /// Make the playlist public and return its share link
    pub async fn share(&self, id: &PlaylistId, actor: &UserId) -> Result<ShareInfo> {
        let playlist = fetch_playlist(&self.pool, id).await?;
        if !playlist.is_owned_by(actor) {
            return Err(ChorusError::forbidden("You can only share your own playlists"));
        }

        if !playlist.is_public {
            let changes = UpdatePlaylist {
                is_public: Some(true),
                ..UpdatePlaylist::default()
            };
            playlists::update(&self.pool, id, &changes).await?;
        }

        Ok(ShareInfo {
            playlist_id: playlist.id.clone(),
            share_url: format!("/playlists/{}", playlist.id),
            is_public: true,
            message: "Playlist is now public and shareable".to_string(),
        })
    }

    /// Copy a playlist the actor owns or that is public
    pub async fn duplicate(
        &self,
        id: &PlaylistId,
        actor: &UserId,
        overrides: DuplicatePlaylist,
    ) -> Result<Playlist> {
        let source = fetch_playlist(&self.pool, id).await?;
        if !source.is_owned_by(actor) && !source.is_public {
            return Err(ChorusError::forbidden("You do not have access to this playlist"));
        }

        let name = overrides
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("{} (Copy)", source.name), str::to_string);

        let request = CreatePlaylist {
            owner_id: actor.clone(),
            name,
            description: source.description.clone(),
            is_public: overrides.is_public.unwrap_or(source.is_public),
            approval_required: false,
            cover_image: source.cover_image.clone(),
        };

        let mut tx = self.pool.begin().await?;
        let copy = playlists::create(&mut *tx, &request).await?;
        CollaboratorRegistry::ensure_owner(&mut tx, &copy.id, actor).await?;
        playlists::membership::copy_tracks(&mut tx, &source.id, &copy.id).await?;
        tx.commit().await?;

        tracing::info!("Playlist {} duplicated as {}", source.id, copy.id);

        self.view(&copy.id).await
    }

    /// Playlists the user owns or collaborates on
    pub async fn list_mine(
        &self,
        user_id: &UserId,
        is_public: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<Playlist>> {
        playlists::list_accessible(&self.pool, user_id, is_public, page).await
    }

    pub async fn list_public(&self, page: PageRequest) -> Result<Page<Playlist>> {
        playlists::list_public(&self.pool, page).await
    }

    /// One user's playlists; private ones only for that user
    pub async fn list_for_user(
        &self,
        owner: &UserId,
        viewer: Option<&UserId>,
        page: PageRequest,
    ) -> Result<Page<Playlist>> {
        let include_private = viewer == Some(owner);
        playlists::list_by_owner(&self.pool, owner, include_private, page).await
    }

    /// Activity log recorded against the playlist
    pub async fn activities(
        &self,
        id: &PlaylistId,
        viewer: Option<&UserId>,
        page: PageRequest,
    ) -> Result<Page<Activity>> {
        let playlist = fetch_playlist(&self.pool, id).await?;
        self.registry.ensure_can_view(&playlist, viewer).await?;

        activities::list_for_entity(&self.pool, EntityType::Playlist, id.as_str(), page).await
    }

    async fn view(&self, id: &PlaylistId) -> Result<Playlist> {
        playlists::get_with_tracks(&self.pool, id)
            .await?
            .ok_or_else(|| ChorusError::not_found("Playlist", id))
    }
}
