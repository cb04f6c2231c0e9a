//! Route definitions for course progress and certificate issuance.
//!
//! Mounted at `/courses`.
//!
//! ```text
//! GET  /{course_id}/progress       get_course_progress
//! POST /{course_id}/progress       update_course_progress (aggregator)
//! POST /{course_id}/certificate    generate_certificate (idempotent)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{certificates, progress};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{course_id}/progress",
            get(progress::get_course_progress).post(progress::update_course_progress),
        )
        .route(
            "/courses/{course_id}/certificate",
            post(certificates::generate_certificate),
        )
}
