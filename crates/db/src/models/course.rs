//! Course catalog models: courses, units, lessons.
//!
//! The catalog tree is authored elsewhere; the engine reads it to
//! locate lessons and recompute hierarchy membership.

use lernix_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A unit row from the `course_units` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CourseUnit {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

/// A lesson row from the `lessons` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub id: DbId,
    pub unit_id: DbId,
    pub title: String,
    pub sort_order: i32,
    pub video_url: Option<String>,
    pub video_duration_secs: Option<f64>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTOs
// ---------------------------------------------------------------------------

/// Input for creating a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: Option<String>,
}

/// Input for creating a unit.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseUnit {
    pub course_id: DbId,
    pub title: String,
    pub sort_order: i32,
}

/// Input for creating a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLesson {
    pub unit_id: DbId,
    pub title: String,
    pub sort_order: i32,
    pub video_url: Option<String>,
    pub video_duration_secs: Option<f64>,
}
