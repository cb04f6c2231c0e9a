//! Route definitions for certificate retrieval.
//!
//! Mounted at `/certificates`.
//!
//! ```text
//! GET /{certificate_id}             view_certificate
//! GET /{certificate_id}/download    download_certificate (302)
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::certificates;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/certificates/{certificate_id}",
            get(certificates::view_certificate),
        )
        .route(
            "/certificates/{certificate_id}/download",
            get(certificates::download_certificate),
        )
}
