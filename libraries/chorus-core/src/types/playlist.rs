/// Playlist domain types
use super::change_request::ChangeRequest;
use super::ids::{ArtistId, PlaylistId, TrackId, UserId};
use super::smart_playlist::SmartPlaylist;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playlist with denormalized aggregates
///
/// `track_count` and `total_duration` always equal the count and the
/// duration sum of the ordered membership; storage recomputes them in the
/// same transaction as every membership change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub approval_required: bool,
    pub cover_image: Option<String>,
    pub track_count: i64,
    /// Seconds
    pub total_duration: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Tracks in playlist (optional, populated when requested)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<PlaylistTrack>>,

    /// Criteria linkage when the playlist is smart (read-only to manual edits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_playlist: Option<SmartPlaylist>,
}

impl Playlist {
    /// Whether `user_id` owns this playlist
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Whether membership is derived from criteria
    pub fn is_smart(&self) -> bool {
        self.smart_playlist.is_some()
    }

    /// Track ids in stored position order, when tracks were loaded
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|t| t.track_id.clone())
            .collect()
    }
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylist {
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub approval_required: bool,
    pub cover_image: Option<String>,
}

impl CreatePlaylist {
    /// Private, unmoderated playlist with just a name
    pub fn new(owner_id: UserId, name: impl Into<String>) -> Self {
        Self {
            owner_id,
            name: name.into(),
            description: None,
            is_public: false,
            approval_required: false,
            cover_image: None,
        }
    }
}

/// Partial update of playlist metadata; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlaylist {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub approval_required: Option<bool>,
    pub cover_image: Option<String>,
}

/// Overrides applied when duplicating a playlist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicatePlaylist {
    pub name: Option<String>,
    pub is_public: Option<bool>,
}

/// Track in a playlist with denormalized data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub track_id: TrackId,
    /// Position in the playlist (0-indexed, dense)
    pub position: i64,
    pub added_at: DateTime<Utc>,

    /// Denormalized fields for display
    pub title: String,
    pub artist_id: ArtistId,
    pub duration: i64,
}

/// Requested position for one member in a reorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPosition {
    pub track_id: TrackId,
    pub position: u32,
}

/// Request to add a track, optionally at a given position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTrack {
    pub track_id: TrackId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

/// Result of an approval-gated mutation
///
/// `Applied` carries the refreshed playlist; `Pending` carries the change
/// request that now awaits the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    Applied(Playlist),
    Pending(ChangeRequest),
}

impl MutationOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// Response of the share operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareInfo {
    pub playlist_id: PlaylistId,
    pub share_url: String,
    pub is_public: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Playlist {
        let now = Utc::now();
        Playlist {
            id: PlaylistId::new("p-1"),
            owner_id: UserId::new("u-1"),
            name: "Late Night".to_string(),
            description: None,
            is_public: false,
            approval_required: false,
            cover_image: None,
            track_count: 0,
            total_duration: 0,
            created_at: now,
            updated_at: now,
            tracks: None,
            smart_playlist: None,
        }
    }

    #[test]
    fn ownership_check() {
        let playlist = sample();
        assert!(playlist.is_owned_by(&UserId::new("u-1")));
        assert!(!playlist.is_owned_by(&UserId::new("u-2")));
        assert!(!playlist.is_smart());
    }

    #[test]
    fn applied_outcome_is_tagged() {
        let outcome = MutationOutcome::Applied(sample());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "applied");
        assert_eq!(json["name"], "Late Night");
        assert!(!outcome.is_pending());
    }

    #[test]
    fn add_track_position_is_optional() {
        let req: AddTrack = serde_json::from_str(r#"{"track_id":"t-1"}"#).unwrap();
        assert_eq!(req.position, None);
        assert!(serde_json::from_str::<AddTrack>(r#"{"track_id":"t-1","position":-1}"#).is_err());
    }
}
