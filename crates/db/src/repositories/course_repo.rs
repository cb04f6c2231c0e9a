//! Repository for the course catalog tables.
//!
//! The engine consumes the catalog read-mostly: it locates lessons and
//! assembles the unit/lesson/quiz tree the completion aggregator
//! recomputes over. Create methods exist for seeding and tests; catalog
//! authoring itself is an external concern.

use sqlx::PgPool;

use lernix_core::progress::{CourseStructure, LessonNode, UnitNode};
use lernix_core::types::DbId;

use crate::models::course::{
    Course, CourseUnit, CreateCourse, CreateCourseUnit, CreateLesson, Lesson,
};

/// Column list for courses queries.
const COURSE_COLUMNS: &str = "id, title, description, created_at, updated_at";

/// Column list for course_units queries.
const UNIT_COLUMNS: &str = "id, course_id, title, sort_order, created_at";

/// Column list for lessons queries.
const LESSON_COLUMNS: &str =
    "id, unit_id, title, sort_order, video_url, video_duration_secs, created_at";

/// Provides catalog operations for courses, units, and lessons.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (title, description)
             VALUES ($1, $2)
             RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a course by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new unit, returning the created row.
    pub async fn create_unit(
        pool: &PgPool,
        input: &CreateCourseUnit,
    ) -> Result<CourseUnit, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_units (course_id, title, sort_order)
             VALUES ($1, $2, $3)
             RETURNING {UNIT_COLUMNS}"
        );
        sqlx::query_as::<_, CourseUnit>(&query)
            .bind(input.course_id)
            .bind(&input.title)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Insert a new lesson, returning the created row.
    pub async fn create_lesson(pool: &PgPool, input: &CreateLesson) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons (unit_id, title, sort_order, video_url, video_duration_secs)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LESSON_COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(input.unit_id)
            .bind(&input.title)
            .bind(input.sort_order)
            .bind(&input.video_url)
            .bind(input.video_duration_secs)
            .fetch_one(pool)
            .await
    }

    /// Find a lesson by primary key.
    pub async fn find_lesson(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The course a lesson belongs to, joining through its unit.
    pub async fn course_of_lesson(
        pool: &PgPool,
        lesson_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT u.course_id FROM lessons l
             JOIN course_units u ON u.id = l.unit_id
             WHERE l.id = $1",
        )
        .bind(lesson_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Assemble the immutable unit/lesson/quiz tree for a course, in
    /// catalog order. Returns `None` when the course does not exist.
    pub async fn find_structure(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Option<CourseStructure>, sqlx::Error> {
        if Self::find_by_id(pool, course_id).await?.is_none() {
            return Ok(None);
        }

        let rows: Vec<(DbId, DbId, Option<DbId>)> = sqlx::query_as(
            "SELECT u.id, l.id, q.id
             FROM course_units u
             JOIN lessons l ON l.unit_id = u.id
             LEFT JOIN quizzes q ON q.lesson_id = l.id
             WHERE u.course_id = $1
             ORDER BY u.sort_order ASC, u.id ASC, l.sort_order ASC, l.id ASC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        let mut units: Vec<UnitNode> = Vec::new();
        for (unit_id, lesson_id, quiz_id) in rows {
            let lesson = LessonNode { id: lesson_id, quiz_id };
            match units.last_mut() {
                Some(u) if u.id == unit_id => u.lessons.push(lesson),
                _ => units.push(UnitNode { id: unit_id, lessons: vec![lesson] }),
            }
        }

        Ok(Some(CourseStructure { course_id, units }))
    }
}
