//! Playlist collaborator rows
//!
//! The owner row is inserted with [`ensure_owner`] in the same transaction
//! that creates the playlist. A partial unique index guarantees at most one
//! accepted owner per playlist.

use chorus_core::{error::Result, types::*, ChorusError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqliteExecutor, SqlitePool};

const COLLABORATOR_COLUMNS: &str =
    "id, playlist_id, user_id, role, status, invited_at, accepted_at";

fn map_collaborator(row: &SqliteRow) -> Result<Collaborator> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;

    Ok(Collaborator {
        id: row.try_get("id")?,
        playlist_id: row.try_get("playlist_id")?,
        user_id: row.try_get("user_id")?,
        role: role.parse().map_err(ChorusError::database)?,
        status: status.parse().map_err(ChorusError::database)?,
        invited_at: row.try_get("invited_at")?,
        accepted_at: row.try_get("accepted_at")?,
    })
}

/// Get collaborator row by ID, scoped to its playlist
pub async fn get_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
    id: &CollaboratorId,
) -> Result<Option<Collaborator>> {
    let sql = format!(
        "SELECT {COLLABORATOR_COLUMNS} FROM playlist_collaborators WHERE id = ? AND playlist_id = ?"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(playlist_id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(map_collaborator).transpose()
}

/// Row for (playlist, user), whatever its status
pub async fn find_for_user<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
    user_id: &UserId,
) -> Result<Option<Collaborator>> {
    let sql = format!(
        "SELECT {COLLABORATOR_COLUMNS} FROM playlist_collaborators WHERE playlist_id = ? AND user_id = ?"
    );
    let row = sqlx::query(&sql)
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(map_collaborator).transpose()
}

/// Collaborators ordered by invite time; `accepted_only` hides pending invites
pub async fn list(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    accepted_only: bool,
) -> Result<Vec<Collaborator>> {
    let sql = format!(
        "SELECT {COLLABORATOR_COLUMNS} FROM playlist_collaborators \
         WHERE playlist_id = ? AND (? = 0 OR status = 'accepted') \
         ORDER BY invited_at ASC, id"
    );
    let rows = sqlx::query(&sql)
        .bind(playlist_id)
        .bind(accepted_only)
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_collaborator).collect()
}

/// Create the accepted owner row unless one already exists
pub async fn ensure_owner(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    owner_id: &UserId,
) -> Result<()> {
    let existing: Option<String> = sqlx::query_scalar(
        "SELECT id FROM playlist_collaborators \
         WHERE playlist_id = ? AND role = 'owner' AND status = 'accepted'",
    )
    .bind(playlist_id)
    .fetch_optional(&mut *conn)
    .await?;

    if existing.is_some() {
        return Ok(());
    }

    insert(&mut *conn, &Collaborator::owner(playlist_id.clone(), owner_id.clone())).await
}

/// Insert a new row
pub async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, collaborator: &Collaborator) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playlist_collaborators (id, playlist_id, user_id, role, status, invited_at, accepted_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&collaborator.id)
    .bind(&collaborator.playlist_id)
    .bind(&collaborator.user_id)
    .bind(collaborator.role.as_str())
    .bind(collaborator.status.as_str())
    .bind(collaborator.invited_at)
    .bind(collaborator.accepted_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Persist role, status and timestamps of an existing row
pub async fn save<'e, E: SqliteExecutor<'e>>(executor: E, collaborator: &Collaborator) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE playlist_collaborators
        SET role = ?, status = ?, invited_at = ?, accepted_at = ?
        WHERE id = ?
        "#,
    )
    .bind(collaborator.role.as_str())
    .bind(collaborator.status.as_str())
    .bind(collaborator.invited_at)
    .bind(collaborator.accepted_at)
    .bind(&collaborator.id)
    .execute(executor)
    .await?;

    Ok(())
}

/// Delete a non-owner row; owner rows are never deleted here
pub async fn delete<'e, E: SqliteExecutor<'e>>(executor: E, id: &CollaboratorId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlist_collaborators WHERE id = ? AND role != 'owner'")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
