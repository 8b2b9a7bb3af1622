//! Smart playlist resolution
//!
//! Turns normalized [`Criteria`] into a concrete, ordered, size-bounded
//! track list. Resolution is deterministic for a given catalog state.

use crate::error::Result;
use crate::traits::{FollowGraph, TrackCatalog};
use crate::types::{Criteria, CriteriaKind, Track, UserId};
use std::sync::Arc;

/// Resolves criteria against the catalog and the follow graph
#[derive(Clone)]
pub struct SmartPlaylistResolver {
    catalog: Arc<dyn TrackCatalog>,
    follows: Arc<dyn FollowGraph>,
}

impl SmartPlaylistResolver {
    pub fn new(catalog: Arc<dyn TrackCatalog>, follows: Arc<dyn FollowGraph>) -> Self {
        Self { catalog, follows }
    }

    /// Resolve `criteria` on behalf of `requesting_user`.
    ///
    /// `FollowedArtistsLatest` with no follows returns an empty list
    /// without querying the catalog.
    pub async fn resolve(&self, criteria: &Criteria, requesting_user: &UserId) -> Result<Vec<Track>> {
        let followed = if matches!(criteria.kind, CriteriaKind::FollowedArtistsLatest) {
            let ids = self.follows.followed_artist_ids(requesting_user).await?;
            if ids.is_empty() {
                tracing::debug!("User {} follows no artists, nothing to resolve", requesting_user);
                return Ok(Vec::new());
            }
            ids
        } else {
            Vec::new()
        };

        let query = criteria.to_query(&followed);
        let mut tracks = self.catalog.find_tracks(&query).await?;
        tracks.retain(|track| track.is_public);
        tracks.truncate(criteria.limit as usize);
        Ok(tracks)
    }
}
