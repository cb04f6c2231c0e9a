//! The certificate issuer.
//!
//! Create-or-return with the storage-level uniqueness constraint as the
//! final race-breaker: two tabs observing the 100% transition at once,
//! or a client retry after a timed-out first request, always converge on
//! the same single certificate row.

use sqlx::PgPool;

use lernix_core::certificate::generate_code;
use lernix_core::error::CoreError;
use lernix_core::types::DbId;
use lernix_db::models::certificate::{Certificate, CreateCertificate};
use lernix_db::repositories::{CertificateRepo, CourseProgressRepo};
use lernix_events::bus::EVENT_CERTIFICATE_ISSUED;
use lernix_events::{EventBus, PlatformEvent};

use crate::documents::DocumentStore;
use crate::error::{AppError, AppResult};

/// Issue the certificate for a (user, course) pair, or return the
/// existing one unchanged.
///
/// Requires the persisted progress row to be complete. Issuance failure
/// never rolls back completion state; the caller simply retries, which
/// is safe because the whole operation is idempotent.
pub async fn issue(
    pool: &PgPool,
    documents: &dyn DocumentStore,
    event_bus: &EventBus,
    user_id: DbId,
    course_id: DbId,
) -> AppResult<Certificate> {
    // Fast path: already issued. No duplicate, no error.
    if let Some(existing) = CertificateRepo::find_for_user_course(pool, user_id, course_id).await? {
        return Ok(existing);
    }

    let completed = CourseProgressRepo::find_for_user_course(pool, user_id, course_id)
        .await?
        .is_some_and(|p| p.completed);
    if !completed {
        return Err(AppError::Core(CoreError::Validation(
            "Course is not complete; no certificate can be issued".into(),
        )));
    }

    let code = generate_code(&mut rand::rng());
    let document_url = documents
        .store_certificate(user_id, course_id, &code)
        .await
        .map_err(|e| AppError::InternalError(format!("Certificate document generation failed: {e}")))?;

    let created = CertificateRepo::create_if_absent(
        pool,
        &CreateCertificate { user_id, course_id, code, document_url },
    )
    .await?;

    match created {
        Some(certificate) => {
            tracing::info!(
                user_id,
                course_id,
                certificate_id = certificate.id,
                "Certificate issued",
            );
            event_bus.publish(
                PlatformEvent::new(EVENT_CERTIFICATE_ISSUED)
                    .with_source("certificate", certificate.id)
                    .with_actor(user_id)
                    .with_payload(serde_json::json!({
                        "course_id": course_id,
                        "code": certificate.code,
                    })),
            );
            Ok(certificate)
        }
        // Lost the insert race: another issuer created the row between
        // our lookup and insert. Return the winner's certificate.
        None => CertificateRepo::find_for_user_course(pool, user_id, course_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(
                    "Certificate insert conflicted but no existing row was found".into(),
                )
            }),
    }
}
