//! Repository for the `course_progress` table.
//!
//! The completion aggregator always writes the full recomputed row, so
//! the upsert replaces every derived column. Concurrent invocations for
//! the same (user, course) interleave safely: each one persists a state
//! derived entirely from the durable source-of-truth stores.

use sqlx::PgPool;

use lernix_core::types::DbId;

use crate::models::course_progress::{CourseProgress, CourseProgressUpsert};

/// Column list for course_progress queries.
const COLUMNS: &str = "id, user_id, course_id, completed_lesson_ids, completed_unit_ids, \
    progress_percent, completed, current_lesson_id, current_unit_id, \
    last_accessed_at, created_at, updated_at";

/// Provides the aggregator's read/write operations on progress rows.
pub struct CourseProgressRepo;

impl CourseProgressRepo {
    /// Find the progress row for a (user, course) pair.
    pub async fn find_for_user_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<CourseProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_progress WHERE user_id = $1 AND course_id = $2"
        );
        sqlx::query_as::<_, CourseProgress>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Persist the full recomputed state, creating the row lazily on the
    /// first progress update after enrollment.
    pub async fn upsert(
        pool: &PgPool,
        input: &CourseProgressUpsert,
    ) -> Result<CourseProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_progress
                (user_id, course_id, completed_lesson_ids, completed_unit_ids,
                 progress_percent, completed, current_lesson_id, current_unit_id,
                 last_accessed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
             ON CONFLICT (user_id, course_id) DO UPDATE
             SET completed_lesson_ids = EXCLUDED.completed_lesson_ids,
                 completed_unit_ids = EXCLUDED.completed_unit_ids,
                 progress_percent = EXCLUDED.progress_percent,
                 completed = EXCLUDED.completed,
                 current_lesson_id = EXCLUDED.current_lesson_id,
                 current_unit_id = EXCLUDED.current_unit_id,
                 last_accessed_at = now(),
                 updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseProgress>(&query)
            .bind(input.user_id)
            .bind(input.course_id)
            .bind(&input.completed_lesson_ids)
            .bind(&input.completed_unit_ids)
            .bind(input.progress_percent)
            .bind(input.completed)
            .bind(input.current_lesson_id)
            .bind(input.current_unit_id)
            .fetch_one(pool)
            .await
    }
}
