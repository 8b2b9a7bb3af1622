//! Chorus Storage
//!
//! `SQLite` persistence for collaborative and smart playlists.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each table family owns its own queries and row mapping
//! - **Transactional Primitives**: Membership changes take a `&mut SqliteConnection`
//!   so callers can group them with aggregate recomputation and ledger updates
//! - **Collaborator Traits**: [`LocalStorageContext`] implements the core traits
//!   (`TrackCatalog`, `UserDirectory`, `FollowGraph`, `ActivitySink`)
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_storage::{LocalStorageContext, create_pool, run_migrations};
//! use chorus_core::{TrackCatalog, TrackId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://chorus.db").await?;
//! run_migrations(&pool).await?;
//!
//! let storage = LocalStorageContext::new(pool);
//! let track = storage.find_track(&TrackId::new("t-1")).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod activities;
pub mod change_requests;
pub mod collaborators;
pub mod follows;
pub mod playlists;
pub mod smart_playlists;
pub mod tracks;
pub mod users;

pub use context::LocalStorageContext;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://chorus.db>`)
///
/// The parent directory of a file-backed database is created when missing.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("Opened SQLite pool at {}", database_url);

    Ok(pool)
}
