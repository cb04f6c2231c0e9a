//! Repository for the `enrollments` table.

use sqlx::PgPool;

use lernix_core::types::DbId;

use crate::models::enrollment::Enrollment;

/// Column list for enrollments queries.
const COLUMNS: &str = "id, user_id, course_id, enrolled_at";

/// Provides enrollment lookups and creation.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll a user in a course, returning the created row.
    pub async fn enroll(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (user_id, course_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_one(pool)
            .await
    }

    /// Whether the user is enrolled in the course.
    pub async fn is_enrolled(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
