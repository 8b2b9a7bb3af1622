//! Activity feed events emitted by playlist operations

use super::ids::{ActivityId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    PlaylistTrackAdded,
    PlaylistTrackRemoved,
    PlaylistCollaboratorInvited,
    PlaylistCollaboratorAccepted,
    PlaylistCollaboratorRejected,
    PlaylistCollaboratorRoleUpdated,
    PlaylistCollaboratorRemoved,
    PlaylistChangeRequested,
    PlaylistChangeApproved,
    PlaylistChangeRejected,
    SmartPlaylistRefreshed,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::PlaylistTrackAdded => "playlist_track_added",
            ActivityType::PlaylistTrackRemoved => "playlist_track_removed",
            ActivityType::PlaylistCollaboratorInvited => "playlist_collaborator_invited",
            ActivityType::PlaylistCollaboratorAccepted => "playlist_collaborator_accepted",
            ActivityType::PlaylistCollaboratorRejected => "playlist_collaborator_rejected",
            ActivityType::PlaylistCollaboratorRoleUpdated => "playlist_collaborator_role_updated",
            ActivityType::PlaylistCollaboratorRemoved => "playlist_collaborator_removed",
            ActivityType::PlaylistChangeRequested => "playlist_change_requested",
            ActivityType::PlaylistChangeApproved => "playlist_change_approved",
            ActivityType::PlaylistChangeRejected => "playlist_change_rejected",
            ActivityType::SmartPlaylistRefreshed => "smart_playlist_refreshed",
        }
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_string()))
            .map_err(|_| format!("unknown activity type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Playlist,
    SmartPlaylist,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Playlist => "playlist",
            EntityType::SmartPlaylist => "smart_playlist",
        }
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playlist" => Ok(EntityType::Playlist),
            "smart_playlist" => Ok(EntityType::SmartPlaylist),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

/// Event handed to the activity sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub user_id: UserId,
    pub activity_type: ActivityType,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub metadata: Value,
}

impl ActivityEvent {
    /// Event recorded against a playlist
    pub fn playlist(
        user_id: UserId,
        activity_type: ActivityType,
        playlist_id: impl ToString,
        metadata: Value,
    ) -> Self {
        Self {
            user_id,
            activity_type,
            entity_type: EntityType::Playlist,
            entity_id: playlist_id.to_string(),
            metadata,
        }
    }
}

/// Stored activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub user_id: UserId,
    pub activity_type: ActivityType,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}
