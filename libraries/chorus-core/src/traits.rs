//! Collaborator traits
//!
//! Playlists depend on a handful of systems they do not own: the track
//! catalog, user lookup, the follow graph and the activity feed. Each is a
//! trait here so the engine can run against `SQLite` in production and
//! against in-memory fakes in tests.

use crate::error::Result;
use crate::types::{ActivityEvent, ArtistId, Track, TrackId, TrackQuery, User, UserId};
use async_trait::async_trait;

/// Read-only access to track metadata
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Look up a single track
    async fn find_track(&self, id: &TrackId) -> Result<Option<Track>>;

    /// Run a bounded query over publicly visible tracks
    async fn find_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>>;
}

/// Resolves invite identifiers to users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Who follows which artists
#[async_trait]
pub trait FollowGraph: Send + Sync {
    /// Artist ids the user follows
    async fn followed_artist_ids(&self, user_id: &UserId) -> Result<Vec<ArtistId>>;
}

/// Append-only activity feed
///
/// Callers treat this as best effort: a failed `record` is logged and
/// never fails the operation that produced the event.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, event: ActivityEvent) -> Result<()>;
}
