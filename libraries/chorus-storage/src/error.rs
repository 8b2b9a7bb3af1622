/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised while opening or migrating the database
///
/// Query failures inside the slices surface directly as
/// [`chorus_core::ChorusError`]; this type covers the setup path.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for chorus_core::ChorusError {
    fn from(err: StorageError) -> Self {
        chorus_core::ChorusError::database(err.to_string())
    }
}
