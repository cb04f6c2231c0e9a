//! Handlers for video completion records.
//!
//! The tracker pushes small periodic updates; the server merges them
//! (max watch time, OR completed) and is the final arbiter of the
//! completion flag.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use lernix_core::error::CoreError;
use lernix_core::types::DbId;
use lernix_db::models::video_completion::VideoCompletionUpdate;
use lernix_db::repositories::{CourseRepo, VideoCompletionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_enrolled;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Get video completion
// ---------------------------------------------------------------------------

/// GET /api/v1/lessons/{lesson_id}/video-completion
///
/// The caller's completion record for a lesson, or null if the tracker
/// never reported anything.
pub async fn get_video_completion(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if CourseRepo::find_lesson(&state.pool, lesson_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Lesson", id: lesson_id }));
    }

    let record =
        VideoCompletionRepo::find_for_user_lesson(&state.pool, auth.user_id, lesson_id).await?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// Update video completion
// ---------------------------------------------------------------------------

/// Request body for `PUT /lessons/{lesson_id}/video-completion`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVideoCompletionInput {
    #[validate(range(min = 0.0))]
    pub watch_time_seconds: f64,
    #[validate(range(min = 0.0))]
    pub total_time_seconds: f64,
    #[validate(range(min = 0.0))]
    pub last_position_seconds: f64,
    /// The tracker's locally computed flag. OR-merged, never trusted to
    /// clear the stored value.
    pub completed: bool,
}

/// PUT /api/v1/lessons/{lesson_id}/video-completion
///
/// Merge one tracker push into the stored record and return the merged
/// result. Stale or duplicated pushes cannot erase progress.
pub async fn update_video_completion(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<UpdateVideoCompletionInput>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let course_id = CourseRepo::course_of_lesson(&state.pool, lesson_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Lesson", id: lesson_id }))?;
    ensure_enrolled(&state.pool, auth.user_id, course_id).await?;

    let record = VideoCompletionRepo::merge(
        &state.pool,
        auth.user_id,
        lesson_id,
        &VideoCompletionUpdate {
            watch_time_seconds: input.watch_time_seconds,
            total_time_seconds: input.total_time_seconds,
            last_position_seconds: input.last_position_seconds,
            completed: input.completed,
        },
    )
    .await?;

    tracing::debug!(
        user_id = auth.user_id,
        lesson_id,
        watch_time = record.watch_time_seconds,
        completed = record.completed,
        "Video completion merged",
    );

    Ok(Json(DataResponse { data: record }))
}
