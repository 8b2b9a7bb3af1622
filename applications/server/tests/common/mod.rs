//! Common test utilities and fixtures
//!
//! Every test gets its own SQLite file in a temp dir with migrations
//! applied, and services wired exactly as the server wires them.

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_core::{
    types::AddTrack,
    ActivityEvent, ActivitySink, ArtistId, ChorusError, Collaborator, MutationOutcome, Playlist,
    PlaylistId, Role, Track, TrackId, User, UserId,
};
use chorus_server::{
    create_router,
    services::{playlists::NewPlaylist, AuthService},
    state::ExternalServices,
    AppState,
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_SECRET: &str = "test-secret-key";

/// Activity sink that always fails
pub struct FailingSink;

#[async_trait]
impl ActivitySink for FailingSink {
    async fn record(&self, _event: ActivityEvent) -> chorus_core::Result<()> {
        Err(ChorusError::database("activity store unavailable"))
    }
}

pub struct TestApp {
    pub state: AppState,
    pub pool: SqlitePool,
    pub auth: Arc<AuthService>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Activity recording fails on every call
    pub async fn with_failing_activity() -> Self {
        Self::build(true).await
    }

    async fn build(failing_activity: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

        let pool = chorus_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");
        chorus_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let auth = Arc::new(AuthService::new(TEST_SECRET.to_string(), 1));

        let mut external = ExternalServices::local(&pool);
        if failing_activity {
            external.activity = Arc::new(FailingSink);
        }
        let state = AppState::with_external(pool.clone(), Arc::clone(&auth), external);

        Self {
            state,
            pool,
            auth,
            _temp_dir: temp_dir,
        }
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }

    pub fn token(&self, user_id: &UserId) -> String {
        self.auth
            .create_access_token(user_id)
            .expect("Failed to create token")
    }

    pub async fn user(&self, username: &str) -> UserId {
        let user = User::new(username, format!("{username}@example.com"));
        chorus_storage::users::create(&self.pool, &user)
            .await
            .expect("Failed to create test user");
        user.id
    }

    /// Public track; `age_days` shifts its timestamps back
    pub async fn track(&self, id: &str, artist: &str, genre: &str, duration: i64, age_days: i64) -> TrackId {
        let created = Utc::now() - Duration::days(age_days);
        let track = Track {
            id: TrackId::new(id),
            title: format!("Track {id}"),
            duration,
            genre: Some(genre.to_string()),
            artist_id: ArtistId::new(artist),
            total_tips: 0.0,
            is_public: true,
            release_date: Some(created),
            created_at: created,
            updated_at: created,
        };
        chorus_storage::tracks::insert(&self.pool, &track)
            .await
            .expect("Failed to create test track");
        track.id
    }

    pub async fn playlist(&self, owner: &UserId, name: &str, approval_required: bool) -> Playlist {
        let request = NewPlaylist {
            name: name.to_string(),
            approval_required,
            ..NewPlaylist::default()
        };
        self.state
            .playlists
            .create(owner, request)
            .await
            .expect("Failed to create test playlist")
    }

    /// Owner appends tracks directly
    pub async fn append(&self, playlist_id: &PlaylistId, owner: &UserId, track_ids: &[TrackId]) {
        for track_id in track_ids {
            let outcome = self
                .state
                .playlists
                .add_track(
                    playlist_id,
                    owner,
                    AddTrack {
                        track_id: track_id.clone(),
                        position: None,
                    },
                )
                .await
                .expect("Failed to append track");
            assert!(matches!(outcome, MutationOutcome::Applied(_)));
        }
    }

    /// Invite `user` with `role` and accept on their behalf
    pub async fn collaborator(
        &self,
        playlist_id: &PlaylistId,
        owner: &UserId,
        username: &str,
        role: Role,
    ) -> (UserId, Collaborator) {
        let user_id = self.user(username).await;
        let invite = self
            .state
            .collaborators
            .invite(playlist_id, owner, username, Some(role))
            .await
            .expect("Failed to invite");
        let accepted = self
            .state
            .collaborators
            .accept(playlist_id, &invite.id, &user_id)
            .await
            .expect("Failed to accept");
        (user_id, accepted)
    }

    /// Stored (track, position) pairs in read order
    pub async fn positions(&self, playlist_id: &PlaylistId) -> Vec<(String, i64)> {
        chorus_storage::playlists::membership::get_tracks(&self.pool, playlist_id)
            .await
            .expect("Failed to load tracks")
            .into_iter()
            .map(|t| (t.track_id.to_string(), t.position))
            .collect()
    }

    pub async fn stored_playlist(&self, playlist_id: &PlaylistId) -> Playlist {
        chorus_storage::playlists::get_by_id(&self.pool, playlist_id)
            .await
            .expect("Failed to load playlist")
            .expect("Playlist missing")
    }

    pub async fn activity_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count activities")
    }

    pub async fn change_request_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM playlist_change_requests")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count change requests")
    }

    pub async fn owner_rows(&self, playlist_id: &PlaylistId) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM playlist_collaborators \
             WHERE playlist_id = ? AND role = 'owner' AND status = 'accepted'",
        )
        .bind(playlist_id)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to count owner rows")
    }
}
