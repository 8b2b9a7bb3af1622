/// Background jobs
pub mod smart_playlist_refresh;

pub use smart_playlist_refresh::SmartPlaylistRefresher;
