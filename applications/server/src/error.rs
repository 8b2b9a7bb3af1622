/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chorus_core::ChorusError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Core(#[from] ChorusError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<chorus_storage::StorageError> for ServerError {
    fn from(err: chorus_storage::StorageError) -> Self {
        ServerError::Core(err.into())
    }
}

impl ServerError {
    /// HTTP status and the message shown to the client
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Core(err) => match err {
                ChorusError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                ChorusError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
                ChorusError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                ChorusError::Database(msg) => {
                    tracing::error!("Database error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database error".to_string(),
                    )
                }
                ChorusError::Serialization(e) => {
                    tracing::error!("Serialization error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
                ChorusError::Other(msg) => {
                    tracing::error!("Internal error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ServerError::Config(msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            ServerError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_taxonomy_maps_to_client_statuses() {
        let cases = [
            (ChorusError::not_found("Playlist", "p-1"), StatusCode::NOT_FOUND),
            (ChorusError::forbidden("Viewers cannot modify"), StatusCode::FORBIDDEN),
            (ChorusError::bad_request("Track already in playlist"), StatusCode::BAD_REQUEST),
            (ChorusError::database("disk I/O error"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let (status, _) = ServerError::from(err).status_and_message();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn database_details_are_not_echoed() {
        let (_, message) =
            ServerError::from(ChorusError::database("no such table: playlists")).status_and_message();
        assert_eq!(message, "Database error");
    }
}
