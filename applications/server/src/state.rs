/// Shared application state
use crate::services::{
    ActivityRecorder, AuthService, CollaboratorRegistry, PlaylistService, SmartPlaylistService,
};
use chorus_core::{ActivitySink, FollowGraph, SmartPlaylistResolver, TrackCatalog, UserDirectory};
use chorus_storage::LocalStorageContext;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth_service: Arc<AuthService>,
    pub collaborators: CollaboratorRegistry,
    pub playlists: PlaylistService,
    pub smart_playlists: SmartPlaylistService,
}

/// External systems the services read from or report to
#[derive(Clone)]
pub struct ExternalServices {
    pub catalog: Arc<dyn TrackCatalog>,
    pub users: Arc<dyn UserDirectory>,
    pub follows: Arc<dyn FollowGraph>,
    pub activity: Arc<dyn ActivitySink>,
}

impl ExternalServices {
    /// Everything backed by the local database
    pub fn local(pool: &SqlitePool) -> Self {
        let storage = Arc::new(LocalStorageContext::new(pool.clone()));
        Self {
            catalog: storage.clone(),
            users: storage.clone(),
            follows: storage.clone(),
            activity: storage,
        }
    }
}

impl AppState {
    pub fn new(pool: SqlitePool, auth_service: Arc<AuthService>) -> Self {
        let external = ExternalServices::local(&pool);
        Self::with_external(pool, auth_service, external)
    }

    pub fn with_external(
        pool: SqlitePool,
        auth_service: Arc<AuthService>,
        external: ExternalServices,
    ) -> Self {
        let activity = ActivityRecorder::new(external.activity);
        let registry = CollaboratorRegistry::new(pool.clone(), external.users, activity.clone());
        let resolver = SmartPlaylistResolver::new(external.catalog.clone(), external.follows);

        Self {
            playlists: PlaylistService::new(
                pool.clone(),
                external.catalog,
                registry.clone(),
                activity.clone(),
            ),
            smart_playlists: SmartPlaylistService::new(pool.clone(), resolver, activity),
            collaborators: registry,
            auth_service,
            pool,
        }
    }
}
