//! Smart playlist service
//!
//! Criteria are normalized once, at the boundary, so preview, creation
//! and refresh all resolve the same validated value.

use super::{activity::ActivityRecorder, collaborators::CollaboratorRegistry};
use chorus_core::{
    types::{CreatePlaylist, CreateSmartPlaylist},
    ActivityEvent, ActivityType, ChorusError, Criteria, EntityType, Playlist, Result,
    SmartPlaylist, SmartPlaylistId, SmartPlaylistResolver, Track, TrackId, UserId,
};
use chorus_storage::{
    playlists::{self, membership},
    smart_playlists::{self, StoredSmartPlaylist},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// Result of refreshing one smart playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Stored membership already matched; nothing was written
    Unchanged,
    Updated { track_count: usize },
}

/// Totals for one refresh-all pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub checked: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct SmartPlaylistService {
    pool: SqlitePool,
    resolver: SmartPlaylistResolver,
    activity: ActivityRecorder,
}

impl SmartPlaylistService {
    pub fn new(pool: SqlitePool, resolver: SmartPlaylistResolver, activity: ActivityRecorder) -> Self {
        Self {
            pool,
            resolver,
            activity,
        }
    }

    /// Resolve raw criteria without persisting anything
    pub async fn preview(&self, user_id: &UserId, criteria: &Value) -> Result<Vec<Track>> {
        let criteria = Criteria::normalize(criteria)?;
        self.resolver.resolve(&criteria, user_id).await
    }

    /// Create the playlist, its owner row, the smart linkage and the
    /// initial membership in one transaction
    pub async fn create(&self, owner: &UserId, input: CreateSmartPlaylist) -> Result<Playlist> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ChorusError::bad_request("Playlist name is required"));
        }

        let criteria = Criteria::normalize(&input.criteria)?;
        let tracks = self.resolver.resolve(&criteria, owner).await?;
        let track_ids: Vec<TrackId> = tracks.iter().map(|t| t.id.clone()).collect();

        let request = CreatePlaylist {
            owner_id: owner.clone(),
            name: name.to_string(),
            description: input.description,
            is_public: input.is_public.unwrap_or(false),
            approval_required: false,
            cover_image: input.cover_image,
        };

        let mut tx = self.pool.begin().await?;
        let playlist = playlists::create(&mut *tx, &request).await?;
        CollaboratorRegistry::ensure_owner(&mut tx, &playlist.id, owner).await?;

        let smart = SmartPlaylist {
            id: SmartPlaylistId::generate(),
            playlist_id: playlist.id.clone(),
            criteria,
            auto_update: input.auto_update.unwrap_or(true),
            last_updated: (!track_ids.is_empty()).then(Utc::now),
        };
        smart_playlists::insert(&mut *tx, &smart).await?;
        membership::replace_tracks(&mut tx, &playlist.id, &track_ids).await?;
        tx.commit().await?;

        tracing::info!(
            "Smart playlist {} created for playlist {} with {} tracks",
            smart.id,
            playlist.id,
            track_ids.len()
        );

        playlists::get_with_tracks(&self.pool, &playlist.id)
            .await?
            .ok_or_else(|| ChorusError::not_found("Playlist", &playlist.id))
    }

    /// Refresh every auto-updating smart playlist.
    ///
    /// A failure is logged and counted; it never stops the pass.
    pub async fn refresh_all(&self) -> Result<RefreshSummary> {
        let stored = smart_playlists::list_auto_update(&self.pool).await?;
        let mut summary = RefreshSummary::default();

        for smart in &stored {
            summary.checked += 1;
            match self.refresh(smart).await {
                Ok(RefreshOutcome::Unchanged) => summary.unchanged += 1,
                Ok(RefreshOutcome::Updated { .. }) => summary.updated += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!("Failed to refresh smart playlist {}: {}", smart.id, e);
                }
            }
        }

        tracing::debug!(
            "Smart playlist refresh: {} checked, {} updated, {} failed",
            summary.checked,
            summary.updated,
            summary.failed
        );

        Ok(summary)
    }

    /// Reconcile one smart playlist with its criteria.
    ///
    /// When the resolved id list equals the stored one element by element,
    /// nothing is written: no membership rows, no timestamp, no activity.
    pub async fn refresh(&self, smart: &StoredSmartPlaylist) -> Result<RefreshOutcome> {
        let criteria = smart.criteria()?;
        let tracks = self.resolver.resolve(&criteria, &smart.owner_id).await?;
        let next: Vec<TrackId> = tracks.into_iter().map(|t| t.id).collect();

        let current = membership::track_ids(&self.pool, &smart.playlist_id).await?;
        if current == next {
            return Ok(RefreshOutcome::Unchanged);
        }

        let mut tx = self.pool.begin().await?;
        membership::replace_tracks(&mut tx, &smart.playlist_id, &next).await?;
        smart_playlists::touch(&mut *tx, &smart.id, Utc::now()).await?;
        tx.commit().await?;

        tracing::info!(
            "Smart playlist {} refreshed with {} tracks",
            smart.id,
            next.len()
        );

        self.activity
            .record(ActivityEvent {
                user_id: smart.owner_id.clone(),
                activity_type: ActivityType::SmartPlaylistRefreshed,
                entity_type: EntityType::SmartPlaylist,
                entity_id: smart.id.to_string(),
                metadata: json!({
                    "playlist_id": smart.playlist_id,
                    "track_count": next.len(),
                }),
            })
            .await;

        Ok(RefreshOutcome::Updated {
            track_count: next.len(),
        })
    }
}
