//! Certificate models.

use lernix_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `certificates` table. Created once, immutable.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Certificate {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub code: String,
    pub document_url: String,
    pub issued_at: Timestamp,
}

/// Input for the idempotent certificate insert.
#[derive(Debug, Clone)]
pub struct CreateCertificate {
    pub user_id: DbId,
    pub course_id: DbId,
    pub code: String,
    pub document_url: String,
}
