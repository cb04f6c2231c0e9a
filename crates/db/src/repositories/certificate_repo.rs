//! Repository for the `certificates` table.
//!
//! `uq_certificates_user_course` is the final race-breaker for
//! concurrent first-completion signals; the application never relies on
//! check-then-insert alone.

use sqlx::PgPool;

use lernix_core::types::DbId;

use crate::models::certificate::{Certificate, CreateCertificate};

/// Column list for certificates queries.
const COLUMNS: &str = "id, user_id, course_id, code, document_url, issued_at";

/// Provides idempotent creation and lookups for certificates.
pub struct CertificateRepo;

impl CertificateRepo {
    /// Find a certificate by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM certificates WHERE id = $1");
        sqlx::query_as::<_, Certificate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the certificate for a (user, course) pair.
    pub async fn find_for_user_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM certificates WHERE user_id = $1 AND course_id = $2");
        sqlx::query_as::<_, Certificate>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert the certificate unless one already exists for the pair.
    ///
    /// `ON CONFLICT DO NOTHING` makes concurrent issuers converge: the
    /// loser of the race gets `None` back and re-reads the winner's row.
    pub async fn create_if_absent(
        pool: &PgPool,
        input: &CreateCertificate,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!(
            "INSERT INTO certificates (user_id, course_id, code, document_url)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, course_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Certificate>(&query)
            .bind(input.user_id)
            .bind(input.course_id)
            .bind(&input.code)
            .bind(&input.document_url)
            .fetch_optional(pool)
            .await
    }
}
