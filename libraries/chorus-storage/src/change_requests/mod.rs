//! Change-request ledger
//!
//! Requests are created pending and move once to approved or rejected.
//! [`mark_reviewed`] only touches pending rows, so a request can never be
//! reviewed twice.

use chorus_core::{error::Result, types::*, ChorusError};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor, SqlitePool};

const REQUEST_COLUMNS: &str =
    "id, playlist_id, requested_by, action, payload, status, reviewed_by, reviewed_at, created_at";

fn map_request(row: &SqliteRow) -> Result<ChangeRequest> {
    let action: String = row.try_get("action")?;
    let payload: String = row.try_get("payload")?;
    let status: String = row.try_get("status")?;

    Ok(ChangeRequest {
        id: row.try_get("id")?,
        playlist_id: row.try_get("playlist_id")?,
        requested_by: row.try_get("requested_by")?,
        proposal: ChangeProposal::from_parts(&action, serde_json::from_str(&payload)?)?,
        status: status.parse().map_err(ChorusError::database)?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Record a new request
pub async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, request: &ChangeRequest) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playlist_change_requests (
            id, playlist_id, requested_by, action, payload, status,
            reviewed_by, reviewed_at, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&request.id)
    .bind(&request.playlist_id)
    .bind(&request.requested_by)
    .bind(request.proposal.action())
    .bind(request.proposal.payload().to_string())
    .bind(request.status.as_str())
    .bind(&request.reviewed_by)
    .bind(request.reviewed_at)
    .bind(request.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Pending request by ID, scoped to its playlist
pub async fn get_pending<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
    id: &ChangeRequestId,
) -> Result<Option<ChangeRequest>> {
    let sql = format!(
        "SELECT {REQUEST_COLUMNS} FROM playlist_change_requests \
         WHERE id = ? AND playlist_id = ? AND status = 'pending'"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(playlist_id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(map_request).transpose()
}

/// Requests for a playlist, newest first, optionally filtered by status
pub async fn list(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    status: Option<ChangeStatus>,
) -> Result<Vec<ChangeRequest>> {
    let sql = format!(
        "SELECT {REQUEST_COLUMNS} FROM playlist_change_requests \
         WHERE playlist_id = ? AND (? IS NULL OR status = ?) \
         ORDER BY created_at DESC, id"
    );
    let status = status.map(|s| s.as_str());
    let rows = sqlx::query(&sql)
        .bind(playlist_id)
        .bind(status)
        .bind(status)
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_request).collect()
}

/// Move a pending request to a terminal status; returns false when it was
/// no longer pending
pub async fn mark_reviewed<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &ChangeRequestId,
    status: ChangeStatus,
    reviewer: &UserId,
    reviewed_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE playlist_change_requests
        SET status = ?, reviewed_by = ?, reviewed_at = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(status.as_str())
    .bind(reviewer)
    .bind(reviewed_at)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
