//! Artist follow graph

use chorus_core::{error::Result, types::*};
use chrono::Utc;
use sqlx::SqliteExecutor;

/// Follow an artist; following twice is a no-op
pub async fn follow<'e, E: SqliteExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    artist_id: &ArtistId,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO follows (follower_id, artist_id, created_at) VALUES (?, ?, ?) \
         ON CONFLICT(follower_id, artist_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(artist_id)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn unfollow<'e, E: SqliteExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    artist_id: &ArtistId,
) -> Result<()> {
    sqlx::query("DELETE FROM follows WHERE follower_id = ? AND artist_id = ?")
        .bind(user_id)
        .bind(artist_id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Artist ids followed by `user_id`
pub async fn followed_artist_ids<'e, E: SqliteExecutor<'e>>(
    executor: E,
    user_id: &UserId,
) -> Result<Vec<ArtistId>> {
    let ids = sqlx::query_scalar("SELECT artist_id FROM follows WHERE follower_id = ? ORDER BY artist_id")
        .bind(user_id)
        .fetch_all(executor)
        .await?;

    Ok(ids)
}
