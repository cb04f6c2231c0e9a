//! HTTP handlers, one module per resource.

pub mod certificates;
pub mod progress;
pub mod quizzes;
pub mod video_progress;

use sqlx::PgPool;

use lernix_core::error::CoreError;
use lernix_core::types::DbId;
use lernix_db::repositories::EnrollmentRepo;

use crate::error::{AppError, AppResult};

/// Reject callers who are not enrolled in the course.
pub(crate) async fn ensure_enrolled(
    pool: &PgPool,
    user_id: DbId,
    course_id: DbId,
) -> AppResult<()> {
    if EnrollmentRepo::is_enrolled(pool, user_id, course_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "User is not enrolled in this course".into(),
        )))
    }
}
