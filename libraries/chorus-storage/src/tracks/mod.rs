//! Track catalog queries
//!
//! Tracks are written by the upload pipeline; playlists only read them.
//! [`insert`] exists for seeding and tests.

use chorus_core::{error::Result, types::*};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteExecutor};

fn map_track(row: &SqliteRow) -> Result<Track> {
    Ok(Track {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        duration: row.try_get("duration")?,
        genre: row.try_get("genre")?,
        artist_id: row.try_get("artist_id")?,
        total_tips: row.try_get("total_tips")?,
        is_public: row.try_get("is_public")?,
        release_date: row.try_get("release_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const TRACK_COLUMNS: &str = "id, title, duration, genre, artist_id, total_tips, is_public, \
     release_date, created_at, updated_at";

/// Get track by ID
pub async fn get_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &TrackId,
) -> Result<Option<Track>> {
    let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;

    row.as_ref().map(map_track).transpose()
}

/// Run a bounded query over public tracks
///
/// Orders are descending with the track id as a final tiebreaker, so equal
/// sort keys still resolve to a stable list.
pub async fn find<'e, E: SqliteExecutor<'e>>(executor: E, query: &TrackQuery) -> Result<Vec<Track>> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE is_public = 1"));

    match &query.filter {
        TrackFilter::All => {}
        TrackFilter::Genres(genres) => {
            builder.push(" AND genre IN (");
            let mut separated = builder.separated(", ");
            for genre in genres {
                separated.push_bind(genre.clone());
            }
            separated.push_unseparated(")");
        }
        TrackFilter::Artists(artist_ids) => {
            builder.push(" AND artist_id IN (");
            let mut separated = builder.separated(", ");
            for artist_id in artist_ids {
                separated.push_bind(artist_id.clone());
            }
            separated.push_unseparated(")");
        }
        TrackFilter::ReleasedBetween { from, to } => {
            builder.push(" AND release_date IS NOT NULL");
            if let Some(from) = from {
                builder.push(" AND release_date >= ").push_bind(*from);
            }
            if let Some(to) = to {
                builder.push(" AND release_date <= ").push_bind(*to);
            }
        }
    }

    builder.push(match query.order {
        TrackOrder::CreatedAt => " ORDER BY created_at DESC, id",
        TrackOrder::TotalTips => " ORDER BY total_tips DESC, id",
        TrackOrder::UpdatedAt => " ORDER BY updated_at DESC, id",
    });
    builder.push(" LIMIT ").push_bind(i64::from(query.limit));

    let rows = builder.build().fetch_all(executor).await?;
    rows.iter().map(map_track).collect()
}

/// Insert a catalog track
pub async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, track: &Track) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tracks (
            id, title, duration, genre, artist_id, total_tips, is_public,
            release_date, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&track.id)
    .bind(&track.title)
    .bind(track.duration)
    .bind(&track.genre)
    .bind(&track.artist_id)
    .bind(track.total_tips)
    .bind(track.is_public)
    .bind(track.release_date)
    .bind(track.created_at)
    .bind(track.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}
