//! Route definitions for per-lesson video completion records.
//!
//! Mounted at `/lessons`.
//!
//! ```text
//! GET /{lesson_id}/video-completion     get_video_completion
//! PUT /{lesson_id}/video-completion     update_video_completion (merge)
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::video_progress;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/lessons/{lesson_id}/video-completion",
        get(video_progress::get_video_completion).put(video_progress::update_video_completion),
    )
}
