//! Handlers for quiz delivery, submission, and attempt history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use lernix_core::error::CoreError;
use lernix_core::quiz::{self, SubmittedAnswer};
use lernix_core::types::DbId;
use lernix_db::models::quiz::{CreateQuizAttempt, QuizAttempt, QuizWithQuestions};
use lernix_db::repositories::{CourseRepo, QuizAttemptRepo, QuizRepo};
use lernix_events::bus::EVENT_QUIZ_SUBMITTED;
use lernix_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_enrolled;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Delivery view
// ---------------------------------------------------------------------------

/// An option as delivered to the learner: no correctness flag.
#[derive(Debug, Serialize)]
pub struct QuizOptionView {
    pub id: DbId,
    pub label: String,
}

/// A question as delivered to the learner: no answer key.
#[derive(Debug, Serialize)]
pub struct QuizQuestionView {
    pub id: DbId,
    pub kind: String,
    pub prompt: String,
    pub points: i32,
    pub options: Vec<QuizOptionView>,
}

/// The learner-facing quiz payload.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub id: DbId,
    pub lesson_id: DbId,
    pub title: String,
    pub passing_score: f64,
    pub time_limit_secs: Option<i32>,
    pub questions: Vec<QuizQuestionView>,
}

impl QuizView {
    fn from_loaded(loaded: QuizWithQuestions) -> Self {
        let QuizWithQuestions { quiz, questions, options } = loaded;
        Self {
            id: quiz.id,
            lesson_id: quiz.lesson_id,
            title: quiz.title,
            passing_score: quiz.passing_score,
            time_limit_secs: quiz.time_limit_secs,
            questions: questions
                .into_iter()
                .map(|q| QuizQuestionView {
                    options: options
                        .iter()
                        .filter(|o| o.question_id == q.id)
                        .map(|o| QuizOptionView { id: o.id, label: o.label.clone() })
                        .collect(),
                    id: q.id,
                    kind: q.kind,
                    prompt: q.prompt,
                    points: q.points,
                })
                .collect(),
        }
    }
}

/// GET /api/v1/quizzes/{quiz_id}
///
/// Deliver the quiz and its questions, with the answer key stripped.
pub async fn get_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let loaded = load_quiz_for_user(&state, &auth, quiz_id).await?;
    Ok(Json(DataResponse { data: QuizView::from_loaded(loaded) }))
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Request body for `POST /quizzes/{quiz_id}/submissions`.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizInput {
    pub answers: Vec<SubmittedAnswer>,
    /// Elapsed seconds as measured by the client's countdown.
    #[serde(default)]
    pub time_taken_seconds: i32,
}

/// Response payload for a scored submission.
#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub score: f64,
    pub passed: bool,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub submission: QuizAttempt,
}

/// POST /api/v1/quizzes/{quiz_id}/submissions
///
/// Validate, score, and record one immutable attempt with
/// `attempt_number = prior max + 1`. A submission referencing questions
/// or options outside the quiz is rejected and never recorded.
pub async fn submit_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<DbId>,
    Json(input): Json<SubmitQuizInput>,
) -> AppResult<impl IntoResponse> {
    let loaded = load_quiz_for_user(&state, &auth, quiz_id).await?;

    let questions = loaded
        .scorable_questions()
        .map_err(AppError::InternalError)?;
    let scored = quiz::score_submission(&questions, &input.answers, loaded.quiz.passing_score)
        .map_err(AppError::Core)?;

    let attempt = QuizAttemptRepo::create(
        &state.pool,
        &CreateQuizAttempt {
            user_id: auth.user_id,
            quiz_id,
            answers: serde_json::to_value(&input.answers)
                .map_err(|e| AppError::InternalError(format!("Failed to serialize answers: {e}")))?,
            score: scored.score,
            passed: scored.passed,
            time_taken_seconds: input.time_taken_seconds.max(0),
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        quiz_id,
        attempt_number = attempt.attempt_number,
        score = attempt.score,
        passed = attempt.passed,
        "Quiz attempt recorded",
    );

    state.event_bus.publish(
        PlatformEvent::new(EVENT_QUIZ_SUBMITTED)
            .with_source("quiz", quiz_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "attempt_number": attempt.attempt_number,
                "score": attempt.score,
                "passed": attempt.passed,
            })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmitQuizResponse {
                score: scored.score,
                passed: scored.passed,
                correct_answers: scored.correct_answers,
                total_questions: scored.total_questions,
                submission: attempt,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Attempt history
// ---------------------------------------------------------------------------

/// GET /api/v1/quizzes/{quiz_id}/submissions
///
/// The caller's attempts, most recent attempt first. Completion
/// tracking is governed by the first element.
pub async fn list_submissions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if QuizRepo::find_by_id(&state.pool, quiz_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Quiz", id: quiz_id }));
    }

    let attempts = QuizAttemptRepo::list_for_user_quiz(&state.pool, auth.user_id, quiz_id).await?;

    Ok(Json(DataResponse { data: attempts }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a quiz with its question tree and verify the caller may take it.
async fn load_quiz_for_user(
    state: &AppState,
    auth: &AuthUser,
    quiz_id: DbId,
) -> AppResult<QuizWithQuestions> {
    let loaded = QuizRepo::find_with_questions(&state.pool, quiz_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Quiz", id: quiz_id }))?;

    let course_id = CourseRepo::course_of_lesson(&state.pool, loaded.quiz.lesson_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: loaded.quiz.lesson_id,
        }))?;
    ensure_enrolled(&state.pool, auth.user_id, course_id).await?;

    Ok(loaded)
}
