//! Course progress models.
//!
//! One fully-derived row per (user, course). Only the completion
//! aggregator writes it, and always as a whole recomputed row.

use lernix_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `course_progress` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CourseProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub completed_lesson_ids: Vec<DbId>,
    pub completed_unit_ids: Vec<DbId>,
    pub progress_percent: f64,
    pub completed: bool,
    pub current_lesson_id: Option<DbId>,
    pub current_unit_id: Option<DbId>,
    pub last_accessed_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The full recomputed state the aggregator persists.
#[derive(Debug, Clone)]
pub struct CourseProgressUpsert {
    pub user_id: DbId,
    pub course_id: DbId,
    pub completed_lesson_ids: Vec<DbId>,
    pub completed_unit_ids: Vec<DbId>,
    pub progress_percent: f64,
    pub completed: bool,
    pub current_lesson_id: Option<DbId>,
    pub current_unit_id: Option<DbId>,
}
