//! Repository for the `quiz_attempts` table.
//!
//! Append-only. Attempt numbers are assigned inside the INSERT from the
//! prior maximum; `uq_quiz_attempts_user_quiz_attempt` turns a
//! concurrent duplicate into a conflict instead of a silent gap or
//! double assignment.

use sqlx::PgPool;

use lernix_core::types::DbId;

use crate::models::quiz::{CreateQuizAttempt, QuizAttempt};

/// Column list for quiz_attempts queries.
const COLUMNS: &str = "id, user_id, quiz_id, attempt_number, answers, score, passed, \
    time_taken_seconds, submitted_at";

/// Provides append and lookup operations for quiz attempts.
pub struct QuizAttemptRepo;

impl QuizAttemptRepo {
    /// Record a scored attempt with `attempt_number = prior max + 1`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateQuizAttempt,
    ) -> Result<QuizAttempt, sqlx::Error> {
        let query = format!(
            "INSERT INTO quiz_attempts
                (user_id, quiz_id, attempt_number, answers, score, passed, time_taken_seconds)
             SELECT $1, $2,
                    COALESCE(MAX(attempt_number), 0) + 1,
                    $3, $4, $5, $6
             FROM quiz_attempts
             WHERE user_id = $1 AND quiz_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuizAttempt>(&query)
            .bind(input.user_id)
            .bind(input.quiz_id)
            .bind(&input.answers)
            .bind(input.score)
            .bind(input.passed)
            .bind(input.time_taken_seconds)
            .fetch_one(pool)
            .await
    }

    /// All attempts for a (user, quiz), most recent attempt first.
    pub async fn list_for_user_quiz(
        pool: &PgPool,
        user_id: DbId,
        quiz_id: DbId,
    ) -> Result<Vec<QuizAttempt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quiz_attempts
             WHERE user_id = $1 AND quiz_id = $2
             ORDER BY attempt_number DESC"
        );
        sqlx::query_as::<_, QuizAttempt>(&query)
            .bind(user_id)
            .bind(quiz_id)
            .fetch_all(pool)
            .await
    }

    /// The most recent attempt for a (user, quiz), if any. Completion
    /// tracking is governed by this attempt, not the best one.
    pub async fn find_latest(
        pool: &PgPool,
        user_id: DbId,
        quiz_id: DbId,
    ) -> Result<Option<QuizAttempt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quiz_attempts
             WHERE user_id = $1 AND quiz_id = $2
             ORDER BY attempt_number DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, QuizAttempt>(&query)
            .bind(user_id)
            .bind(quiz_id)
            .fetch_optional(pool)
            .await
    }
}
