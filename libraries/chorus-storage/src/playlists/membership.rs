//! Ordered playlist membership
//!
//! Positions are 0-based and dense. Every writer here recomputes the
//! playlist's `track_count` and `total_duration` from the membership rows
//! before returning, so callers that run these inside one transaction never
//! commit drifted aggregates.

use chorus_core::{error::Result, types::*};
use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqliteExecutor};

/// Ordered tracks of a playlist with denormalized track fields
pub async fn get_tracks<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
) -> Result<Vec<PlaylistTrack>> {
    let rows = sqlx::query(
        r#"
        SELECT pt.track_id, pt.position, pt.added_at, t.title, t.artist_id, t.duration
        FROM playlist_tracks pt
        INNER JOIN tracks t ON pt.track_id = t.id
        WHERE pt.playlist_id = ?
        ORDER BY pt.position, pt.added_at, pt.track_id
        "#,
    )
    .bind(playlist_id)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(PlaylistTrack {
                track_id: row.try_get("track_id")?,
                position: row.try_get("position")?,
                added_at: row.try_get("added_at")?,
                title: row.try_get("title")?,
                artist_id: row.try_get("artist_id")?,
                duration: row.try_get("duration")?,
            })
        })
        .collect()
}

/// Track ids in stored position order
pub async fn track_ids<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
) -> Result<Vec<TrackId>> {
    let ids = sqlx::query_scalar(
        "SELECT track_id FROM playlist_tracks WHERE playlist_id = ? \
         ORDER BY position, added_at, track_id",
    )
    .bind(playlist_id)
    .fetch_all(executor)
    .await?;

    Ok(ids)
}

/// Stored position of a member, if present
pub async fn position_of<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
    track_id: &TrackId,
) -> Result<Option<i64>> {
    let position = sqlx::query_scalar(
        "SELECT position FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?",
    )
    .bind(playlist_id)
    .bind(track_id)
    .fetch_optional(executor)
    .await?;

    Ok(position)
}

/// Insert a track, shifting later rows when a position inside the list is
/// requested; otherwise append. Returns the stored position.
///
/// A requested position past the highest stored one appends. Positions
/// left sparse by a reorder still shift from the requested slot.
pub async fn insert_track(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    track_id: &TrackId,
    position: Option<u32>,
) -> Result<i64> {
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_tracks WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .fetch_one(&mut *conn)
    .await?;

    let position = match position.map(i64::from) {
        Some(requested) if requested < next => {
            sqlx::query(
                "UPDATE playlist_tracks SET position = position + 1 \
                 WHERE playlist_id = ? AND position >= ?",
            )
            .bind(playlist_id)
            .bind(requested)
            .execute(&mut *conn)
            .await?;
            requested
        }
        _ => next,
    };

    sqlx::query(
        "INSERT INTO playlist_tracks (playlist_id, track_id, position, added_at) VALUES (?, ?, ?, ?)",
    )
    .bind(playlist_id)
    .bind(track_id)
    .bind(position)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    recompute_aggregates(&mut *conn, playlist_id).await?;

    Ok(position)
}

/// Remove a member and close the gap; returns the removed position, or
/// `None` when the track was not a member
pub async fn remove_track(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    track_id: &TrackId,
) -> Result<Option<i64>> {
    let Some(removed) = position_of(&mut *conn, playlist_id, track_id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?")
        .bind(playlist_id)
        .bind(track_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "UPDATE playlist_tracks SET position = position - 1 \
         WHERE playlist_id = ? AND position > ?",
    )
    .bind(playlist_id)
    .bind(removed)
    .execute(&mut *conn)
    .await?;

    recompute_aggregates(&mut *conn, playlist_id).await?;

    Ok(Some(removed))
}

/// Set each listed member's position directly, in the order given.
///
/// Other rows are not renumbered. Duplicate target positions are stored
/// as given; reads break the tie by `added_at`, then track id.
pub async fn set_positions(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    positions: &[TrackPosition],
) -> Result<()> {
    for entry in positions {
        sqlx::query("UPDATE playlist_tracks SET position = ? WHERE playlist_id = ? AND track_id = ?")
            .bind(i64::from(entry.position))
            .bind(playlist_id)
            .bind(&entry.track_id)
            .execute(&mut *conn)
            .await?;
    }

    recompute_aggregates(&mut *conn, playlist_id).await?;

    Ok(())
}

/// Replace the whole membership with `track_ids` at positions `0..N-1`
pub async fn replace_tracks(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    track_ids: &[TrackId],
) -> Result<()> {
    sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ?")
        .bind(playlist_id)
        .execute(&mut *conn)
        .await?;

    let now = Utc::now();
    for (position, track_id) in track_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO playlist_tracks (playlist_id, track_id, position, added_at) VALUES (?, ?, ?, ?)",
        )
        .bind(playlist_id)
        .bind(track_id)
        .bind(position as i64)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }

    recompute_aggregates(&mut *conn, playlist_id).await?;

    Ok(())
}

/// Copy membership from one playlist to another, renumbered `0..N-1` in
/// the source's read order
pub async fn copy_tracks(
    conn: &mut SqliteConnection,
    from: &PlaylistId,
    to: &PlaylistId,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playlist_tracks (playlist_id, track_id, position, added_at)
        SELECT ?, track_id,
               ROW_NUMBER() OVER (ORDER BY position, added_at, track_id) - 1,
               ?
        FROM playlist_tracks
        WHERE playlist_id = ?
        "#,
    )
    .bind(to)
    .bind(Utc::now())
    .bind(from)
    .execute(&mut *conn)
    .await?;

    recompute_aggregates(&mut *conn, to).await?;

    Ok(())
}

/// Recompute `track_count` and `total_duration` from membership
pub async fn recompute_aggregates<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE playlists SET
            track_count = (
                SELECT COUNT(*) FROM playlist_tracks WHERE playlist_id = ?
            ),
            total_duration = (
                SELECT COALESCE(SUM(t.duration), 0)
                FROM playlist_tracks pt
                INNER JOIN tracks t ON pt.track_id = t.id
                WHERE pt.playlist_id = ?
            ),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(playlist_id)
    .bind(playlist_id)
    .bind(Utc::now())
    .bind(playlist_id)
    .execute(executor)
    .await?;

    Ok(())
}
