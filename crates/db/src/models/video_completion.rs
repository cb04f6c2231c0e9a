//! Video completion models.
//!
//! One row per (user, lesson). Tracker pushes are merged, never
//! overwritten: watch time only grows and `completed` never reverts.

use lernix_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `video_completions` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VideoCompletion {
    pub id: DbId,
    pub user_id: DbId,
    pub lesson_id: DbId,
    pub watch_time_seconds: f64,
    pub total_time_seconds: f64,
    pub last_position_seconds: f64,
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One tracker push, merged into the stored record.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoCompletionUpdate {
    pub watch_time_seconds: f64,
    pub total_time_seconds: f64,
    pub last_position_seconds: f64,
    pub completed: bool,
}
