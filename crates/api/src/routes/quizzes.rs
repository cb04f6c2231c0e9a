//! Route definitions for quiz delivery and submissions.
//!
//! Mounted at `/quizzes`.
//!
//! ```text
//! GET  /{quiz_id}                get_quiz (answer key stripped)
//! POST /{quiz_id}/submissions    submit_quiz
//! GET  /{quiz_id}/submissions    list_submissions (latest-first)
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::quizzes;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quizzes/{quiz_id}", get(quizzes::get_quiz))
        .route(
            "/quizzes/{quiz_id}/submissions",
            get(quizzes::list_submissions).post(quizzes::submit_quiz),
        )
}
