//! Handlers for course progress reads and the completion aggregator.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use lernix_core::types::DbId;
use lernix_db::models::course_progress::CourseProgress;
use lernix_db::repositories::CourseProgressRepo;
use lernix_events::bus::{
    EVENT_COURSE_COMPLETED, EVENT_LESSON_COMPLETED, EVENT_UNIT_COMPLETED,
};
use lernix_events::PlatformEvent;

use crate::engine::{certificates, completion};
use crate::error::AppResult;
use crate::handlers::ensure_enrolled;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Get course progress
// ---------------------------------------------------------------------------

/// GET /api/v1/courses/{course_id}/progress
///
/// The caller's progress row, or null before the first update.
pub async fn get_course_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_enrolled(&state.pool, auth.user_id, course_id).await?;

    let progress =
        CourseProgressRepo::find_for_user_course(&state.pool, auth.user_id, course_id).await?;

    Ok(Json(DataResponse { data: progress }))
}

// ---------------------------------------------------------------------------
// Update course progress (the aggregator operation)
// ---------------------------------------------------------------------------

/// Request body for `POST /courses/{course_id}/progress`.
#[derive(Debug, Deserialize)]
pub struct UpdateCourseProgressInput {
    pub lesson_id: DbId,
    /// The caller's assertion. The server re-verifies it against the
    /// video and quiz stores and rejects anything it cannot confirm.
    pub completed: bool,
}

/// Response payload for a progress update.
#[derive(Debug, Serialize)]
pub struct UpdateCourseProgressResponse {
    pub progress: CourseProgress,
    pub lesson_completed: bool,
    pub unit_completed: bool,
    pub course_completed: bool,
    pub progress_percentage: f64,
}

/// POST /api/v1/courses/{course_id}/progress
///
/// Run the completion aggregator for one lesson. On the false -> true
/// course transition, issues the certificate exactly once; issuance
/// failure is reported in logs but never unwinds the committed
/// completion state.
pub async fn update_course_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<UpdateCourseProgressInput>,
) -> AppResult<impl IntoResponse> {
    let outcome = completion::update_course_progress(
        &state.pool,
        auth.user_id,
        course_id,
        input.lesson_id,
        input.completed,
    )
    .await?;

    publish_transitions(&state, &auth, course_id, &outcome);

    if outcome.course_completed_transition {
        // Completion is already durable; a failed issuance is retried
        // via the certificate endpoint.
        if let Err(e) = certificates::issue(
            &state.pool,
            state.documents.as_ref(),
            &state.event_bus,
            auth.user_id,
            course_id,
        )
        .await
        {
            tracing::warn!(
                user_id = auth.user_id,
                course_id,
                error = %e,
                "Certificate issuance failed after course completion",
            );
        }
    }

    Ok(Json(DataResponse {
        data: UpdateCourseProgressResponse {
            lesson_completed: outcome.lesson_completed,
            unit_completed: outcome.unit_completed,
            course_completed: outcome.course_completed,
            progress_percentage: outcome.progress.progress_percent,
            progress: outcome.progress,
        },
    }))
}

/// Publish events for every completion edge this invocation crossed.
fn publish_transitions(
    state: &AppState,
    auth: &AuthUser,
    course_id: DbId,
    outcome: &completion::ProgressUpdateOutcome,
) {
    if outcome.lesson_completed_transition {
        state.event_bus.publish(
            PlatformEvent::new(EVENT_LESSON_COMPLETED)
                .with_source("course", course_id)
                .with_actor(auth.user_id)
                .with_payload(serde_json::json!({ "lesson_id": outcome.lesson_id })),
        );
    }
    if outcome.unit_completed_transition {
        state.event_bus.publish(
            PlatformEvent::new(EVENT_UNIT_COMPLETED)
                .with_source("course", course_id)
                .with_actor(auth.user_id)
                .with_payload(serde_json::json!({ "unit_id": outcome.unit_id })),
        );
    }
    if outcome.course_completed_transition {
        state.event_bus.publish(
            PlatformEvent::new(EVENT_COURSE_COMPLETED)
                .with_source("course", course_id)
                .with_actor(auth.user_id)
                .with_payload(serde_json::json!({
                    "progress_percent": outcome.progress.progress_percent,
                })),
        );
    }
}
