//! Handlers for certificate issuance and retrieval.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect};
use axum::Json;

use lernix_core::error::CoreError;
use lernix_core::types::DbId;
use lernix_db::models::certificate::Certificate;
use lernix_db::repositories::CertificateRepo;

use crate::engine::certificates;
use crate::error::{AppError, AppResult};
use crate::handlers::ensure_enrolled;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// POST /api/v1/courses/{course_id}/certificate
///
/// Idempotent create-or-fetch. Concurrent requests and client retries
/// all return the same certificate identity.
pub async fn generate_certificate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_enrolled(&state.pool, auth.user_id, course_id).await?;

    let certificate = certificates::issue(
        &state.pool,
        state.documents.as_ref(),
        &state.event_bus,
        auth.user_id,
        course_id,
    )
    .await?;

    Ok(Json(DataResponse { data: certificate }))
}

// ---------------------------------------------------------------------------
// View / download
// ---------------------------------------------------------------------------

/// GET /api/v1/certificates/{certificate_id}
///
/// Certificate metadata, including the document URL.
pub async fn view_certificate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(certificate_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let certificate = find_owned(&state, &auth, certificate_id).await?;
    Ok(Json(DataResponse { data: certificate }))
}

/// GET /api/v1/certificates/{certificate_id}/download
///
/// Redirect to the document store's artifact URL.
pub async fn download_certificate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(certificate_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let certificate = find_owned(&state, &auth, certificate_id).await?;
    Ok(Redirect::temporary(&certificate.document_url))
}

/// Load a certificate and verify the caller owns it.
async fn find_owned(
    state: &AppState,
    auth: &AuthUser,
    certificate_id: DbId,
) -> AppResult<Certificate> {
    let certificate = CertificateRepo::find_by_id(&state.pool, certificate_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Certificate",
            id: certificate_id,
        }))?;

    if certificate.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Certificate belongs to another user".into(),
        )));
    }

    Ok(certificate)
}
