//! Hierarchical completion recompute for the lesson/unit/course tree.
//!
//! The completion aggregator never applies deltas. It re-derives lesson
//! truth from the video and quiz stores, then calls [`recompute`] with
//! the full membership set; the snapshot that comes back is a pure
//! function of `(structure, completed lessons)`, which is what makes
//! concurrent and repeated invocations converge to the same state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Course structure
// ---------------------------------------------------------------------------

/// A lesson as the aggregator sees it: identity plus its optional quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonNode {
    pub id: DbId,
    pub quiz_id: Option<DbId>,
}

/// A unit and its lessons, in course order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitNode {
    pub id: DbId,
    pub lessons: Vec<LessonNode>,
}

/// The immutable unit/lesson tree of one course, as provided by the
/// course catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseStructure {
    pub course_id: DbId,
    pub units: Vec<UnitNode>,
}

impl CourseStructure {
    /// Fixed total lesson count of the course.
    pub fn total_lessons(&self) -> usize {
        self.units.iter().map(|u| u.lessons.len()).sum()
    }

    /// Find a lesson anywhere in the tree.
    pub fn lesson(&self, lesson_id: DbId) -> Option<&LessonNode> {
        self.units
            .iter()
            .flat_map(|u| u.lessons.iter())
            .find(|l| l.id == lesson_id)
    }

    /// The unit a lesson belongs to.
    pub fn unit_of(&self, lesson_id: DbId) -> Option<DbId> {
        self.units
            .iter()
            .find(|u| u.lessons.iter().any(|l| l.id == lesson_id))
            .map(|u| u.id)
    }

    /// All lesson ids in course order.
    pub fn lesson_ids(&self) -> impl Iterator<Item = DbId> + '_ {
        self.units.iter().flat_map(|u| u.lessons.iter().map(|l| l.id))
    }
}

// ---------------------------------------------------------------------------
// Lesson truth
// ---------------------------------------------------------------------------

/// Quiz half of the lesson-completion requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStatus {
    /// The lesson owns no quiz.
    NotRequired,
    /// The lesson owns a quiz with no attempts yet.
    NotAttempted,
    /// The most recent attempt passed.
    LatestPassed,
    /// The most recent attempt failed.
    LatestFailed,
}

impl QuizStatus {
    /// From the latest attempt of a lesson that owns a quiz.
    pub fn from_latest_attempt(passed: Option<bool>) -> Self {
        match passed {
            None => Self::NotAttempted,
            Some(true) => Self::LatestPassed,
            Some(false) => Self::LatestFailed,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::NotRequired | Self::LatestPassed)
    }
}

/// A lesson is complete iff its video is complete and its quiz
/// requirement (latest attempt) is satisfied.
pub fn lesson_requirements_met(video_completed: bool, quiz: QuizStatus) -> bool {
    video_completed && quiz.is_satisfied()
}

// ---------------------------------------------------------------------------
// Snapshot recompute
// ---------------------------------------------------------------------------

/// Fully derived progress state for one (user, course).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub completed_lessons: BTreeSet<DbId>,
    pub completed_units: BTreeSet<DbId>,
    /// `100 x |completed lessons| / total lessons`, rounded to 2 decimals.
    pub progress_percent: f64,
    pub completed: bool,
}

/// Rebuild the snapshot from the full membership set.
///
/// Lesson ids outside the structure are dropped (the stored set is
/// always a subset of the course's lessons). A unit is complete exactly
/// when every one of its lessons is. Deterministic: ordered sets, fixed
/// rounding, so identical inputs produce an identical snapshot.
pub fn recompute(
    structure: &CourseStructure,
    completed_lessons: impl IntoIterator<Item = DbId>,
) -> ProgressSnapshot {
    let valid: BTreeSet<DbId> = structure.lesson_ids().collect();
    let completed_lessons: BTreeSet<DbId> = completed_lessons
        .into_iter()
        .filter(|id| valid.contains(id))
        .collect();

    let completed_units: BTreeSet<DbId> = structure
        .units
        .iter()
        .filter(|u| {
            !u.lessons.is_empty() && u.lessons.iter().all(|l| completed_lessons.contains(&l.id))
        })
        .map(|u| u.id)
        .collect();

    let total = structure.total_lessons();
    let progress_percent = if total == 0 {
        0.0
    } else {
        round2(completed_lessons.len() as f64 / total as f64 * 100.0)
    };

    ProgressSnapshot {
        completed: progress_percent >= 100.0,
        completed_lessons,
        completed_units,
        progress_percent,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
