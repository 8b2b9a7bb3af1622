mod activity;
mod change_request;
mod collaborator;
mod ids;
mod page;
mod playlist;
mod smart_playlist;
mod track;
mod user;

pub use activity::{Activity, ActivityEvent, ActivityType, EntityType};
pub use change_request::{ChangeProposal, ChangeRequest, ChangeStatus};
pub use collaborator::{Collaborator, CollaboratorStatus, Role};
pub use ids::{
    ActivityId, ArtistId, ChangeRequestId, CollaboratorId, PlaylistId, SmartPlaylistId, TrackId,
    UserId,
};
pub use page::{Page, PageMeta, PageRequest};
pub use playlist::{
    AddTrack, CreatePlaylist, DuplicatePlaylist, MutationOutcome, Playlist, PlaylistTrack,
    ShareInfo, TrackPosition, UpdatePlaylist,
};
pub use smart_playlist::{
    CreateSmartPlaylist, Criteria, CriteriaKind, SmartPlaylist, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use track::{Track, TrackFilter, TrackOrder, TrackQuery};
pub use user::User;
