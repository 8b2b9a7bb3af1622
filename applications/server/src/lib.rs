//! Chorus Server Library
//!
//! HTTP server for collaborative and smart playlists: collaborator
//! registry, approval-gated membership edits, smart playlist resolution
//! and the periodic refresh job.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use api::create_router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use jobs::SmartPlaylistRefresher;
pub use services::{
    ActivityRecorder, AuthService, CollaboratorRegistry, PlaylistService, SmartPlaylistService,
};
pub use state::{AppState, ExternalServices};
