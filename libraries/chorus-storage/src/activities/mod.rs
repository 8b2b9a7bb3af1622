//! Append-only activity log

use chorus_core::{error::Result, types::*, ChorusError};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor, SqlitePool};

fn map_activity(row: &SqliteRow) -> Result<Activity> {
    let activity_type: String = row.try_get("activity_type")?;
    let entity_type: String = row.try_get("entity_type")?;
    let metadata: String = row.try_get("metadata")?;

    Ok(Activity {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        activity_type: activity_type.parse().map_err(ChorusError::database)?,
        entity_type: entity_type.parse().map_err(ChorusError::database)?,
        entity_id: row.try_get("entity_id")?,
        metadata: serde_json::from_str(&metadata)?,
        created_at: row.try_get("created_at")?,
    })
}

/// Append an event
pub async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, event: &ActivityEvent) -> Result<Activity> {
    let activity = Activity {
        id: ActivityId::generate(),
        user_id: event.user_id.clone(),
        activity_type: event.activity_type,
        entity_type: event.entity_type,
        entity_id: event.entity_id.clone(),
        metadata: event.metadata.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO activities (id, user_id, activity_type, entity_type, entity_id, metadata, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&activity.id)
    .bind(&activity.user_id)
    .bind(activity.activity_type.as_str())
    .bind(activity.entity_type.as_str())
    .bind(&activity.entity_id)
    .bind(activity.metadata.to_string())
    .bind(activity.created_at)
    .execute(executor)
    .await?;

    Ok(activity)
}

/// Activities recorded against one entity, newest first
pub async fn list_for_entity(
    pool: &SqlitePool,
    entity_type: EntityType,
    entity_id: &str,
    page: PageRequest,
) -> Result<Page<Activity>> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activities WHERE entity_type = ? AND entity_id = ?",
    )
    .bind(entity_type.as_str())
    .bind(entity_id)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(
        "SELECT id, user_id, activity_type, entity_type, entity_id, metadata, created_at \
         FROM activities WHERE entity_type = ? AND entity_id = ? \
         ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
    )
    .bind(entity_type.as_str())
    .bind(entity_id)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let data = rows.iter().map(map_activity).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(data, total, page))
}
