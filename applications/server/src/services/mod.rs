/// Server services
pub mod activity;
pub mod auth;
pub mod collaborators;
pub mod playlists;
pub mod smart_playlists;

pub use activity::ActivityRecorder;
pub use auth::AuthService;
pub use collaborators::CollaboratorRegistry;
pub use playlists::PlaylistService;
pub use smart_playlists::{RefreshOutcome, RefreshSummary, SmartPlaylistService};

use chorus_core::{ChorusError, Playlist, PlaylistId, Result};
use sqlx::SqliteExecutor;

/// Playlist row or NotFound
pub(crate) async fn fetch_playlist<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &PlaylistId,
) -> Result<Playlist> {
    chorus_storage::playlists::get_by_id(executor, id)
        .await?
        .ok_or_else(|| ChorusError::not_found("Playlist", id))
}
