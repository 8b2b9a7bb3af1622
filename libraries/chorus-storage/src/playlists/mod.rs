//! Playlist rows and listings
//!
//! Ordered membership lives in [`membership`]; everything here reads or
//! writes the `playlists` row itself.

pub mod membership;

use chorus_core::{error::Result, types::*};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor, SqlitePool};

const PLAYLIST_COLUMNS: &str = "p.id, p.owner_id, p.name, p.description, p.is_public, \
     p.approval_required, p.cover_image, p.track_count, p.total_duration, \
     p.created_at, p.updated_at";

fn map_playlist(row: &SqliteRow) -> Result<Playlist> {
    Ok(Playlist {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_public: row.try_get("is_public")?,
        approval_required: row.try_get("approval_required")?,
        cover_image: row.try_get("cover_image")?,
        track_count: row.try_get("track_count")?,
        total_duration: row.try_get("total_duration")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        tracks: None,
        smart_playlist: None,
    })
}

/// Insert a new playlist row with empty aggregates
pub async fn create<'e, E: SqliteExecutor<'e>>(
    executor: E,
    input: &CreatePlaylist,
) -> Result<Playlist> {
    let now = Utc::now();
    let playlist = Playlist {
        id: PlaylistId::generate(),
        owner_id: input.owner_id.clone(),
        name: input.name.clone(),
        description: input.description.clone(),
        is_public: input.is_public,
        approval_required: input.approval_required,
        cover_image: input.cover_image.clone(),
        track_count: 0,
        total_duration: 0,
        created_at: now,
        updated_at: now,
        tracks: None,
        smart_playlist: None,
    };

    sqlx::query(
        r#"
        INSERT INTO playlists (
            id, owner_id, name, description, is_public, approval_required,
            cover_image, track_count, total_duration, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)
        "#,
    )
    .bind(&playlist.id)
    .bind(&playlist.owner_id)
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(playlist.is_public)
    .bind(playlist.approval_required)
    .bind(&playlist.cover_image)
    .bind(playlist.created_at)
    .bind(playlist.updated_at)
    .execute(executor)
    .await?;

    Ok(playlist)
}

/// Get playlist row by ID (no tracks)
pub async fn get_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &PlaylistId,
) -> Result<Option<Playlist>> {
    let sql = format!("SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;

    row.as_ref().map(map_playlist).transpose()
}

/// Get playlist with ordered tracks and smart playlist linkage
pub async fn get_with_tracks(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<Playlist>> {
    let Some(mut playlist) = get_by_id(pool, id).await? else {
        return Ok(None);
    };

    playlist.tracks = Some(membership::get_tracks(pool, id).await?);
    playlist.smart_playlist = crate::smart_playlists::get_by_playlist(pool, id).await?;

    Ok(Some(playlist))
}

/// Apply a partial metadata update; returns false when the playlist is gone
pub async fn update<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &PlaylistId,
    changes: &UpdatePlaylist,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE playlists SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            is_public = COALESCE(?, is_public),
            approval_required = COALESCE(?, approval_required),
            cover_image = COALESCE(?, cover_image),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(changes.is_public)
    .bind(changes.approval_required)
    .bind(&changes.cover_image)
    .bind(Utc::now())
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a playlist; membership, collaborators, change requests and
/// smart linkage cascade
pub async fn delete<'e, E: SqliteExecutor<'e>>(executor: E, id: &PlaylistId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Playlists the user owns or has accepted a collaboration on
pub async fn list_accessible(
    pool: &SqlitePool,
    user_id: &UserId,
    is_public: Option<bool>,
    page: PageRequest,
) -> Result<Page<Playlist>> {
    let filter = r#"
        FROM playlists p
        WHERE (p.owner_id = ?
               OR EXISTS (
                   SELECT 1 FROM playlist_collaborators pc
                   WHERE pc.playlist_id = p.id AND pc.user_id = ? AND pc.status = 'accepted'
               ))
          AND (? IS NULL OR p.is_public = ?)
    "#;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {filter}"))
        .bind(user_id)
        .bind(user_id)
        .bind(is_public)
        .bind(is_public)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(&format!(
        "SELECT {PLAYLIST_COLUMNS} {filter} ORDER BY p.created_at DESC, p.id LIMIT ? OFFSET ?"
    ))
    .bind(user_id)
    .bind(user_id)
    .bind(is_public)
    .bind(is_public)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let data = rows.iter().map(map_playlist).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(data, total, page))
}

/// All public playlists, newest first
pub async fn list_public(pool: &SqlitePool, page: PageRequest) -> Result<Page<Playlist>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlists WHERE is_public = 1")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(&format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.is_public = 1 \
         ORDER BY p.created_at DESC, p.id LIMIT ? OFFSET ?"
    ))
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let data = rows.iter().map(map_playlist).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(data, total, page))
}

/// Playlists owned by `owner_id`; only public ones unless `include_private`
pub async fn list_by_owner(
    pool: &SqlitePool,
    owner_id: &UserId,
    include_private: bool,
    page: PageRequest,
) -> Result<Page<Playlist>> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM playlists WHERE owner_id = ? AND (? OR is_public = 1)",
    )
    .bind(owner_id)
    .bind(include_private)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(&format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.owner_id = ? AND (? OR p.is_public = 1) \
         ORDER BY p.created_at DESC, p.id LIMIT ? OFFSET ?"
    ))
    .bind(owner_id)
    .bind(include_private)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let data = rows.iter().map(map_playlist).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(data, total, page))
}
