//! Repository for the `video_completions` table.
//!
//! Writes merge rather than overwrite: multiple tabs or devices can
//! report overlapping, out-of-order windows for the same lesson, and a
//! stale smaller report must never erase real progress.

use sqlx::PgPool;

use lernix_core::types::DbId;

use crate::models::video_completion::{VideoCompletion, VideoCompletionUpdate};

/// Column list for video_completions queries.
const COLUMNS: &str = "id, user_id, lesson_id, watch_time_seconds, total_time_seconds, \
    last_position_seconds, completed, created_at, updated_at";

/// Provides merge-upsert and lookups for video completion records.
pub struct VideoCompletionRepo;

impl VideoCompletionRepo {
    /// Find the record for a (user, lesson) pair.
    pub async fn find_for_user_lesson(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<Option<VideoCompletion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM video_completions WHERE user_id = $1 AND lesson_id = $2"
        );
        sqlx::query_as::<_, VideoCompletion>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(pool)
            .await
    }

    /// Merge one tracker push into the stored record.
    ///
    /// `watch_time_seconds = GREATEST(stored, incoming)` and
    /// `completed = stored OR incoming`, so both fields are monotonic.
    /// Position always takes the incoming value; total time takes the
    /// incoming value when positive (players can correct a bad duration).
    pub async fn merge(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
        update: &VideoCompletionUpdate,
    ) -> Result<VideoCompletion, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_completions
                (user_id, lesson_id, watch_time_seconds, total_time_seconds,
                 last_position_seconds, completed)
             VALUES ($1, $2, GREATEST($3, 0), GREATEST($4, 0), GREATEST($5, 0), $6)
             ON CONFLICT (user_id, lesson_id) DO UPDATE
             SET watch_time_seconds = GREATEST(video_completions.watch_time_seconds, EXCLUDED.watch_time_seconds),
                 total_time_seconds = CASE
                     WHEN EXCLUDED.total_time_seconds > 0 THEN EXCLUDED.total_time_seconds
                     ELSE video_completions.total_time_seconds
                 END,
                 last_position_seconds = EXCLUDED.last_position_seconds,
                 completed = video_completions.completed OR EXCLUDED.completed,
                 updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoCompletion>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .bind(update.watch_time_seconds)
            .bind(update.total_time_seconds)
            .bind(update.last_position_seconds)
            .bind(update.completed)
            .fetch_one(pool)
            .await
    }
}
