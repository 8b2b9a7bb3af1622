//! Chorus Core
//!
//! Platform-agnostic domain types, traits, and error handling for Chorus
//! collaborative and smart playlists.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Playlist`, `Collaborator`, `ChangeRequest`, `Criteria`, etc.
//! - **Collaborator Traits**: `TrackCatalog`, `UserDirectory`, `FollowGraph`, `ActivitySink`
//! - **Resolution**: [`SmartPlaylistResolver`] turns criteria into track lists
//! - **Ranking**: pure decay and ranking functions for leaderboards
//! - **Error Handling**: Unified `ChorusError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chorus_core::types::{Criteria, CriteriaKind};
//! use serde_json::json;
//!
//! let criteria = Criteria::normalize(&json!({ "type": "genre", "genre": "lofi" })).unwrap();
//! assert_eq!(criteria.limit, 50);
//! assert!(matches!(criteria.kind, CriteriaKind::Genre { .. }));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod ranking;
pub mod resolver;
pub mod traits;
pub mod types;

pub use error::{ChorusError, Result};
pub use resolver::SmartPlaylistResolver;
pub use traits::{ActivitySink, FollowGraph, TrackCatalog, UserDirectory};

pub use types::{
    Activity, ActivityEvent, ActivityType, ArtistId, ChangeProposal, ChangeRequest,
    ChangeRequestId, ChangeStatus, Collaborator, CollaboratorId, CollaboratorStatus, Criteria,
    CriteriaKind, EntityType, MutationOutcome, Page, PageRequest, Playlist, PlaylistId,
    PlaylistTrack, Role, SmartPlaylist, SmartPlaylistId, Track, TrackId, User, UserId,
};
