//! Smart playlist linkage rows

use chorus_core::{error::Result, types::*};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor};

/// Map a linkage row; `None` when its stored criteria no longer decode
fn map_smart_playlist(row: &SqliteRow) -> Result<Option<SmartPlaylist>> {
    let id: SmartPlaylistId = row.try_get("id")?;
    let raw: String = row.try_get("criteria")?;

    let criteria = match decode_criteria(&raw) {
        Ok(criteria) => criteria,
        Err(e) => {
            tracing::warn!("Smart playlist {} has unreadable criteria: {}", id, e);
            return Ok(None);
        }
    };

    Ok(Some(SmartPlaylist {
        id,
        playlist_id: row.try_get("playlist_id")?,
        criteria,
        auto_update: row.try_get("auto_update")?,
        last_updated: row.try_get("last_updated")?,
    }))
}

fn decode_criteria(raw: &str) -> Result<Criteria> {
    Criteria::from_stored(&serde_json::from_str(raw)?)
}

/// Attach criteria to a playlist
pub async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, smart: &SmartPlaylist) -> Result<()> {
    let criteria = smart.criteria.to_value()?.to_string();

    sqlx::query(
        "INSERT INTO smart_playlists (id, playlist_id, criteria, auto_update, last_updated) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&smart.id)
    .bind(&smart.playlist_id)
    .bind(criteria)
    .bind(smart.auto_update)
    .bind(smart.last_updated)
    .execute(executor)
    .await?;

    Ok(())
}

/// Smart linkage of a playlist, if any.
///
/// A row whose criteria fail to decode is logged and left out, so the
/// playlist itself stays readable.
pub async fn get_by_playlist<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
) -> Result<Option<SmartPlaylist>> {
    let row = sqlx::query(
        "SELECT id, playlist_id, criteria, auto_update, last_updated \
         FROM smart_playlists WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.as_ref().map(map_smart_playlist).transpose()?.flatten())
}

/// Whether the playlist is criteria-driven
pub async fn exists_for_playlist<'e, E: SqliteExecutor<'e>>(
    executor: E,
    playlist_id: &PlaylistId,
) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM smart_playlists WHERE playlist_id = ?")
        .bind(playlist_id)
        .fetch_one(executor)
        .await?;

    Ok(count > 0)
}

/// Raw auto-updating rows
///
/// Criteria are decoded per row by the caller so one corrupt row cannot
/// hide the rest.
pub async fn list_auto_update<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<Vec<StoredSmartPlaylist>> {
    let rows = sqlx::query(
        "SELECT s.id, s.playlist_id, s.criteria, p.owner_id \
         FROM smart_playlists s INNER JOIN playlists p ON p.id = s.playlist_id \
         WHERE s.auto_update = 1 ORDER BY s.id",
    )
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(StoredSmartPlaylist {
                id: row.try_get("id")?,
                playlist_id: row.try_get("playlist_id")?,
                owner_id: row.try_get("owner_id")?,
                criteria: row.try_get("criteria")?,
            })
        })
        .collect()
}

/// An auto-updating smart playlist as stored, criteria undecoded
#[derive(Debug, Clone)]
pub struct StoredSmartPlaylist {
    pub id: SmartPlaylistId,
    pub playlist_id: PlaylistId,
    pub owner_id: UserId,
    pub criteria: String,
}

impl StoredSmartPlaylist {
    pub fn criteria(&self) -> Result<Criteria> {
        decode_criteria(&self.criteria)
    }
}

/// Stamp the last successful refresh
pub async fn touch<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &SmartPlaylistId,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE smart_playlists SET last_updated = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}
