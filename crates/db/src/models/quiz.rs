//! Quiz models: quizzes, questions, options, and attempts.

use lernix_core::quiz::{QuestionKind, ScorableOption, ScorableQuestion};
use lernix_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A quiz row from the `quizzes` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: DbId,
    pub lesson_id: DbId,
    pub title: String,
    pub passing_score: f64,
    pub time_limit_secs: Option<i32>,
    pub created_at: Timestamp,
}

/// A question row from the `quiz_questions` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: DbId,
    pub quiz_id: DbId,
    pub kind: String,
    pub prompt: String,
    pub points: i32,
    pub sort_order: i32,
    /// JSON array of accepted free-text answers.
    pub accepted_answers: serde_json::Value,
}

/// An option row from the `quiz_options` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: DbId,
    pub question_id: DbId,
    pub label: String,
    pub is_correct: bool,
    pub sort_order: i32,
}

/// An attempt row from the `quiz_attempts` table. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: DbId,
    pub user_id: DbId,
    pub quiz_id: DbId,
    pub attempt_number: i32,
    /// The submitted answers, as recorded at scoring time.
    pub answers: serde_json::Value,
    pub score: f64,
    pub passed: bool,
    pub time_taken_seconds: i32,
    pub submitted_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTOs
// ---------------------------------------------------------------------------

/// Input for creating a quiz.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuiz {
    pub lesson_id: DbId,
    pub title: String,
    pub passing_score: f64,
    pub time_limit_secs: Option<i32>,
}

/// Input for creating a question.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuizQuestion {
    pub quiz_id: DbId,
    pub kind: String,
    pub prompt: String,
    pub points: i32,
    pub sort_order: i32,
    pub accepted_answers: serde_json::Value,
}

/// Input for creating an option.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuizOption {
    pub question_id: DbId,
    pub label: String,
    pub is_correct: bool,
    pub sort_order: i32,
}

/// Input for recording a scored attempt.
#[derive(Debug, Clone)]
pub struct CreateQuizAttempt {
    pub user_id: DbId,
    pub quiz_id: DbId,
    pub answers: serde_json::Value,
    pub score: f64,
    pub passed: bool,
    pub time_taken_seconds: i32,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// A quiz with its full question/option tree, for scoring.
#[derive(Debug, Clone)]
pub struct QuizWithQuestions {
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestion>,
    pub options: Vec<QuizOption>,
}

impl QuizWithQuestions {
    /// Assemble the scorer's view of the question set.
    ///
    /// Unknown question kinds or malformed accepted-answer payloads are
    /// data corruption; they surface as an error string for the caller
    /// to wrap.
    pub fn scorable_questions(&self) -> Result<Vec<ScorableQuestion>, String> {
        self.questions
            .iter()
            .map(|q| {
                let kind = QuestionKind::from_str_value(&q.kind)?;
                let accepted_answers: Vec<String> =
                    serde_json::from_value(q.accepted_answers.clone())
                        .map_err(|e| format!("Malformed accepted_answers for question {}: {e}", q.id))?;
                Ok(ScorableQuestion {
                    id: q.id,
                    kind,
                    points: q.points,
                    options: self
                        .options
                        .iter()
                        .filter(|o| o.question_id == q.id)
                        .map(|o| ScorableOption { id: o.id, is_correct: o.is_correct })
                        .collect(),
                    accepted_answers,
                })
            })
            .collect()
    }
}
