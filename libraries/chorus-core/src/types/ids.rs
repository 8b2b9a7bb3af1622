/// ID types for Chorus entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "sqlx-support")]
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode, Encode, Sqlite, Type,
};

/// Declares a string-backed identifier stored as `TEXT` in `SQLite`.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl Type<Sqlite> for $name {
            fn type_info() -> SqliteTypeInfo {
                <String as Type<Sqlite>>::type_info()
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                args: &mut Vec<SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <String as Encode<Sqlite>>::encode_by_ref(&self.0, args)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <String as Decode<Sqlite>>::decode(value)?;
                Ok($name(s))
            }
        }
    };
}

string_id!(
    /// User identifier
    UserId
);
string_id!(
    /// Track identifier
    TrackId
);
string_id!(
    /// Artist identifier
    ArtistId
);
string_id!(
    /// Playlist identifier
    PlaylistId
);
string_id!(
    /// Collaborator row identifier
    CollaboratorId
);
string_id!(
    /// Change request identifier
    ChangeRequestId
);
string_id!(
    /// Smart playlist identifier (distinct from the playlist it drives)
    SmartPlaylistId
);
string_id!(
    /// Activity log entry identifier
    ActivityId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_generation_creates_unique_ids() {
        let id1 = UserId::generate();
        let id2 = UserId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn track_id_from_string() {
        let id = TrackId::new("track-123");
        assert_eq!(id.as_str(), "track-123");
    }

    #[test]
    fn playlist_id_display() {
        let id = PlaylistId::new("playlist-456");
        assert_eq!(format!("{}", id), "playlist-456");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ChangeRequestId::new("cr-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"cr-1\"");
    }
}
