//! The completion aggregator.
//!
//! The one place where "is this lesson done" is decided. Given a
//! lesson-completion request, it re-derives truth from the video and
//! quiz stores (never trusting the caller's assertion), rebuilds the
//! hierarchical membership sets via `lernix_core::progress`, and
//! persists the full recomputed row.
//!
//! Because every invocation recomputes from durable stores instead of
//! applying a delta, concurrent invocations for the same (user, course)
//! are safe to interleave and repeated calls converge on the same
//! persisted state.

use sqlx::PgPool;

use lernix_core::error::CoreError;
use lernix_core::progress::{self, QuizStatus};
use lernix_core::types::DbId;
use lernix_db::models::course_progress::{CourseProgress, CourseProgressUpsert};
use lernix_db::repositories::{
    CourseProgressRepo, CourseRepo, EnrollmentRepo, QuizAttemptRepo, VideoCompletionRepo,
};

use crate::error::{AppError, AppResult};

/// Result of one aggregator invocation.
#[derive(Debug, Clone)]
pub struct ProgressUpdateOutcome {
    /// The persisted progress row.
    pub progress: CourseProgress,
    /// The triggering lesson.
    pub lesson_id: DbId,
    /// The triggering lesson's unit.
    pub unit_id: Option<DbId>,
    /// Whether the triggering lesson is (now) complete.
    pub lesson_completed: bool,
    /// Whether the triggering lesson's unit is (now) complete.
    pub unit_completed: bool,
    /// Whether the course is (now) complete.
    pub course_completed: bool,
    /// Whether this invocation added the lesson to the completed set.
    pub lesson_completed_transition: bool,
    /// Whether this invocation completed the lesson's unit.
    pub unit_completed_transition: bool,
    /// Whether this invocation transitioned the course false -> true.
    /// The certificate issuer fires on exactly this edge.
    pub course_completed_transition: bool,
}

/// Re-derive and persist progress for `(user, course)` after a lesson
/// completion request.
///
/// All verification happens before any write; a failed check never
/// leaves a partial update behind.
pub async fn update_course_progress(
    pool: &PgPool,
    user_id: DbId,
    course_id: DbId,
    lesson_id: DbId,
    asserted_completed: bool,
) -> AppResult<ProgressUpdateOutcome> {
    // 1. Only enrolled users accrue progress.
    if !EnrollmentRepo::is_enrolled(pool, user_id, course_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "User is not enrolled in this course".into(),
        )));
    }

    // 2. The lesson must exist inside this course's tree.
    let structure = CourseRepo::find_structure(pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Course", id: course_id }))?;
    let lesson = structure
        .lesson(lesson_id)
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Lesson", id: lesson_id }))?;

    // 3. Recompute truth from the source-of-truth stores, independent of
    //    the caller's assertion.
    let video_completed = VideoCompletionRepo::find_for_user_lesson(pool, user_id, lesson_id)
        .await?
        .is_some_and(|vc| vc.completed);
    let quiz_status = match lesson.quiz_id {
        None => QuizStatus::NotRequired,
        Some(quiz_id) => {
            let latest = QuizAttemptRepo::find_latest(pool, user_id, quiz_id).await?;
            QuizStatus::from_latest_attempt(latest.map(|a| a.passed))
        }
    };
    let actual_completed = progress::lesson_requirements_met(video_completed, quiz_status);

    // 4. A completion claim the stores cannot verify is rejected, never
    //    silently accepted.
    if asserted_completed && !actual_completed {
        return Err(AppError::Core(CoreError::Validation(
            "Lesson completion requirements not yet met".into(),
        )));
    }

    // 5. Update membership for this lesson, then recompute the hierarchy
    //    over the full set.
    let unit_id = structure.unit_of(lesson_id);
    let prior = CourseProgressRepo::find_for_user_course(pool, user_id, course_id).await?;
    let previously_completed = prior.as_ref().is_some_and(|p| p.completed);
    let previously_lesson_member = prior
        .as_ref()
        .is_some_and(|p| p.completed_lesson_ids.contains(&lesson_id));
    let previously_unit_member = prior
        .as_ref()
        .zip(unit_id)
        .is_some_and(|(p, u)| p.completed_unit_ids.contains(&u));
    let mut completed_lessons: Vec<DbId> =
        prior.map(|p| p.completed_lesson_ids).unwrap_or_default();
    completed_lessons.retain(|id| *id != lesson_id);
    if actual_completed {
        completed_lessons.push(lesson_id);
    }

    // 6. Percent and completed fall out of the recomputed snapshot.
    let snapshot = progress::recompute(&structure, completed_lessons);

    // 7. Nothing left to resume once the course is complete.
    let (current_lesson_id, current_unit_id) = if snapshot.completed {
        (None, None)
    } else {
        (Some(lesson_id), unit_id)
    };

    // 8. Persist the full recomputed row.
    let row = CourseProgressRepo::upsert(
        pool,
        &CourseProgressUpsert {
            user_id,
            course_id,
            completed_lesson_ids: snapshot.completed_lessons.iter().copied().collect(),
            completed_unit_ids: snapshot.completed_units.iter().copied().collect(),
            progress_percent: snapshot.progress_percent,
            completed: snapshot.completed,
            current_lesson_id,
            current_unit_id,
        },
    )
    .await?;

    let unit_completed = unit_id.is_some_and(|u| snapshot.completed_units.contains(&u));

    tracing::info!(
        user_id,
        course_id,
        lesson_id,
        lesson_completed = actual_completed,
        progress_percent = row.progress_percent,
        course_completed = row.completed,
        "Course progress recomputed",
    );

    Ok(ProgressUpdateOutcome {
        lesson_id,
        unit_id,
        lesson_completed: actual_completed,
        unit_completed,
        course_completed: row.completed,
        lesson_completed_transition: actual_completed && !previously_lesson_member,
        unit_completed_transition: unit_completed && !previously_unit_member,
        course_completed_transition: row.completed && !previously_completed,
        progress: row,
    })
}
