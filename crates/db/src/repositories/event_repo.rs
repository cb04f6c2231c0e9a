//! Repository for the `events` table.

use sqlx::PgPool;

use lernix_core::types::DbId;

use crate::models::event::EventRecord;

/// Column list for events queries.
const COLUMNS: &str =
    "id, event_type, source_entity_type, source_entity_id, actor_user_id, payload, created_at";

/// Provides durable writes for platform events.
pub struct EventRepo;

impl EventRepo {
    /// Append one event row.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<EventRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (event_type, source_entity_type, source_entity_id, actor_user_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventRecord>(&query)
            .bind(event_type)
            .bind(source_entity_type)
            .bind(source_entity_id)
            .bind(actor_user_id)
            .bind(payload)
            .fetch_one(pool)
            .await
    }

    /// Most recent events of one type, newest first.
    pub async fn list_recent_by_type(
        pool: &PgPool,
        event_type: &str,
        limit: i64,
    ) -> Result<Vec<EventRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE event_type = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, EventRecord>(&query)
            .bind(event_type)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
