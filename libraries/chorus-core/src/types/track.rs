//! Track catalog types
//!
//! Tracks are owned by the catalog (uploads, tipping); playlists only
//! reference them. Smart playlists read them through [`TrackQuery`].

use super::ids::{ArtistId, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Track metadata as seen by playlists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    /// Duration in whole seconds
    pub duration: i64,
    pub genre: Option<String>,
    pub artist_id: ArtistId,
    /// Sum of all verified tips, in XLM
    pub total_tips: f64,
    pub is_public: bool,
    pub release_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter applied to publicly visible tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackFilter {
    /// No filter beyond visibility
    All,
    /// Genre in set
    Genres(Vec<String>),
    /// Artist in set
    Artists(Vec<ArtistId>),
    /// Release date within inclusive bounds
    ReleasedBetween {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

/// Sort order for a track query, always descending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOrder {
    CreatedAt,
    TotalTips,
    UpdatedAt,
}

/// A bounded, ordered query over public tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub filter: TrackFilter,
    pub order: TrackOrder,
    pub limit: u32,
}
