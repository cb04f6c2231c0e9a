//! Repository for the `quizzes`, `quiz_questions`, and `quiz_options`
//! tables.

use sqlx::PgPool;

use lernix_core::types::DbId;

use crate::models::quiz::{
    CreateQuiz, CreateQuizOption, CreateQuizQuestion, Quiz, QuizOption, QuizQuestion,
    QuizWithQuestions,
};

/// Column list for quizzes queries.
const QUIZ_COLUMNS: &str = "id, lesson_id, title, passing_score, time_limit_secs, created_at";

/// Column list for quiz_questions queries.
const QUESTION_COLUMNS: &str = "id, quiz_id, kind, prompt, points, sort_order, accepted_answers";

/// Column list for quiz_options queries.
const OPTION_COLUMNS: &str = "id, question_id, label, is_correct, sort_order";

/// Provides quiz catalog operations.
pub struct QuizRepo;

impl QuizRepo {
    /// Insert a new quiz, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateQuiz) -> Result<Quiz, sqlx::Error> {
        let query = format!(
            "INSERT INTO quizzes (lesson_id, title, passing_score, time_limit_secs)
             VALUES ($1, $2, $3, $4)
             RETURNING {QUIZ_COLUMNS}"
        );
        sqlx::query_as::<_, Quiz>(&query)
            .bind(input.lesson_id)
            .bind(&input.title)
            .bind(input.passing_score)
            .bind(input.time_limit_secs)
            .fetch_one(pool)
            .await
    }

    /// Insert a new question, returning the created row.
    pub async fn create_question(
        pool: &PgPool,
        input: &CreateQuizQuestion,
    ) -> Result<QuizQuestion, sqlx::Error> {
        let query = format!(
            "INSERT INTO quiz_questions (quiz_id, kind, prompt, points, sort_order, accepted_answers)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {QUESTION_COLUMNS}"
        );
        sqlx::query_as::<_, QuizQuestion>(&query)
            .bind(input.quiz_id)
            .bind(&input.kind)
            .bind(&input.prompt)
            .bind(input.points)
            .bind(input.sort_order)
            .bind(&input.accepted_answers)
            .fetch_one(pool)
            .await
    }

    /// Insert a new option, returning the created row.
    pub async fn create_option(
        pool: &PgPool,
        input: &CreateQuizOption,
    ) -> Result<QuizOption, sqlx::Error> {
        let query = format!(
            "INSERT INTO quiz_options (question_id, label, is_correct, sort_order)
             VALUES ($1, $2, $3, $4)
             RETURNING {OPTION_COLUMNS}"
        );
        sqlx::query_as::<_, QuizOption>(&query)
            .bind(input.question_id)
            .bind(&input.label)
            .bind(input.is_correct)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a quiz by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quiz>, sqlx::Error> {
        let query = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1");
        sqlx::query_as::<_, Quiz>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The quiz a lesson owns, if any.
    pub async fn find_for_lesson(
        pool: &PgPool,
        lesson_id: DbId,
    ) -> Result<Option<Quiz>, sqlx::Error> {
        let query = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE lesson_id = $1");
        sqlx::query_as::<_, Quiz>(&query)
            .bind(lesson_id)
            .fetch_optional(pool)
            .await
    }

    /// Load a quiz together with its full question/option tree, in
    /// catalog order.
    pub async fn find_with_questions(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<QuizWithQuestions>, sqlx::Error> {
        let Some(quiz) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let questions_query = format!(
            "SELECT {QUESTION_COLUMNS} FROM quiz_questions
             WHERE quiz_id = $1
             ORDER BY sort_order ASC, id ASC"
        );
        let questions = sqlx::query_as::<_, QuizQuestion>(&questions_query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        let options_query = format!(
            "SELECT o.id, o.question_id, o.label, o.is_correct, o.sort_order
             FROM quiz_options o
             JOIN quiz_questions q ON q.id = o.question_id
             WHERE q.quiz_id = $1
             ORDER BY o.question_id ASC, o.sort_order ASC, o.id ASC"
        );
        let options = sqlx::query_as::<_, QuizOption>(&options_query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(Some(QuizWithQuestions { quiz, questions, options }))
    }
}
