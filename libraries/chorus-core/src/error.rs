/// Core error types for Chorus
use thiserror::Error;

/// Result type alias using `ChorusError`
pub type Result<T> = std::result::Result<T, ChorusError>;

/// Core error type for Chorus
///
/// The first three variants form the user-facing taxonomy: every rejected
/// mutation is reported as one of them before any write happens.
#[derive(Error, Debug)]
pub enum ChorusError {
    /// Entity not found (playlist, track, collaborator, change request)
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Role insufficient, ownership required, or read-only playlist
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request is well-formed but cannot be applied
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ChorusError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Whether this error belongs to the client-facing taxonomy
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Forbidden(_) | Self::BadRequest(_)
        )
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ChorusError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = ChorusError::not_found("Playlist", "p-1");
        assert_eq!(err.to_string(), "Playlist not found: p-1");
        assert!(err.is_client_error());
    }

    #[test]
    fn database_errors_are_not_client_errors() {
        assert!(!ChorusError::database("locked").is_client_error());
    }
}
