pub mod certificates;
pub mod courses;
pub mod health;
pub mod lessons;
pub mod quizzes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /lessons/{lesson_id}/video-completion        get, put (merge upsert)
///
/// /quizzes/{quiz_id}                           delivery view (no answer key)
/// /quizzes/{quiz_id}/submissions               submit (POST), history (GET, latest-first)
///
/// /courses/{course_id}/progress                get, update (completion aggregator)
/// /courses/{course_id}/certificate             idempotent create-or-fetch (POST)
///
/// /certificates/{certificate_id}               view metadata
/// /certificates/{certificate_id}/download      302 to the document store
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(lessons::router())
        .merge(quizzes::router())
        .merge(courses::router())
        .merge(certificates::router())
}
