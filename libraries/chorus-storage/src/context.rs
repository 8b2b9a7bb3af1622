use crate::{activities, follows, tracks, users};
use async_trait::async_trait;
use chorus_core::{
    error::Result,
    traits::{ActivitySink, FollowGraph, TrackCatalog, UserDirectory},
    types::*,
};
use sqlx::SqlitePool;

/// `SQLite`-backed implementation of the playlist collaborator traits
#[derive(Clone)]
pub struct LocalStorageContext {
    pool: SqlitePool,
}

impl LocalStorageContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TrackCatalog for LocalStorageContext {
    async fn find_track(&self, id: &TrackId) -> Result<Option<Track>> {
        tracks::get_by_id(&self.pool, id).await
    }

    async fn find_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>> {
        tracks::find(&self.pool, query).await
    }
}

#[async_trait]
impl UserDirectory for LocalStorageContext {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        users::find_by_username(&self.pool, username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        users::find_by_email(&self.pool, email).await
    }
}

#[async_trait]
impl FollowGraph for LocalStorageContext {
    async fn followed_artist_ids(&self, user_id: &UserId) -> Result<Vec<ArtistId>> {
        follows::followed_artist_ids(&self.pool, user_id).await
    }
}

#[async_trait]
impl ActivitySink for LocalStorageContext {
    async fn record(&self, event: ActivityEvent) -> Result<()> {
        activities::insert(&self.pool, &event).await?;
        Ok(())
    }
}
