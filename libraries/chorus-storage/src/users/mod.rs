//! User lookup queries

use chorus_core::{error::Result, types::*};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor};

fn map_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a user
pub async fn create<'e, E: SqliteExecutor<'e>>(executor: E, user: &User) -> Result<()> {
    sqlx::query("INSERT INTO users (id, username, email, created_at) VALUES (?, ?, ?, ?)")
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.created_at)
        .execute(executor)
        .await?;

    Ok(())
}

/// Get user by ID
pub async fn get_by_id<'e, E: SqliteExecutor<'e>>(executor: E, id: &UserId) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, email, created_at FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(map_user).transpose()
}

/// Exact, case-sensitive username match
pub async fn find_by_username<'e, E: SqliteExecutor<'e>>(
    executor: E,
    username: &str,
) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, email, created_at FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(map_user).transpose()
}

/// Case-insensitive email match
pub async fn find_by_email<'e, E: SqliteExecutor<'e>>(
    executor: E,
    email: &str,
) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, username, email, created_at FROM users WHERE email = ? COLLATE NOCASE",
    )
    .bind(email)
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(map_user).transpose()
}
