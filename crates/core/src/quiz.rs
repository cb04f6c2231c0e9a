//! Quiz session state machine, answer validation, and scoring.
//!
//! The per-(user, quiz) view moves `NotStarted -> InProgress ->
//! Submitted`. A quiz with a time limit starts a countdown on entry to
//! `InProgress`; expiry forces a non-cancelable submission of whatever
//! answers exist at that instant. Scoring itself is a pure function of
//! the question set and the submitted answers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Default minimum percentage score for a passing attempt.
pub const DEFAULT_PASSING_SCORE: f64 = 70.0;

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Kind of a quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    FreeText,
}

impl QuestionKind {
    /// Convert from the database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "single_choice" => Ok(Self::SingleChoice),
            "multiple_choice" => Ok(Self::MultipleChoice),
            "true_false" => Ok(Self::TrueFalse),
            "free_text" => Ok(Self::FreeText),
            _ => Err(format!(
                "Invalid question kind '{s}'. Must be one of: single_choice, \
                 multiple_choice, true_false, free_text"
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::FreeText => "free_text",
        }
    }
}

/// An answer option of a choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorableOption {
    pub id: DbId,
    pub is_correct: bool,
}

/// A question as the scorer sees it: identity, kind, weight, and the
/// correct-answer key. Loaded by the caller; assembled from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorableQuestion {
    pub id: DbId,
    pub kind: QuestionKind,
    /// Point value of the question; scores are percentages of the total
    /// point value, so weights are relative.
    pub points: i32,
    /// Options, for the choice kinds. Empty for free text.
    pub options: Vec<ScorableOption>,
    /// Accepted free-text answers, matched trimmed and case-insensitive.
    pub accepted_answers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// One submitted answer, referencing a question of the quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: DbId,
    /// Selected options for choice kinds.
    #[serde(default)]
    pub selected_option_ids: Vec<DbId>,
    /// Free-text response.
    #[serde(default)]
    pub text_response: Option<String>,
}

// ---------------------------------------------------------------------------
// Scoring results
// ---------------------------------------------------------------------------

/// Per-question outcome of a scored submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: DbId,
    pub correct: bool,
    pub points_earned: i32,
}

/// Outcome of scoring one full submission.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredSubmission {
    /// Percentage of the total point value earned, rounded to 2 decimals.
    pub score: f64,
    pub passed: bool,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub results: Vec<QuestionResult>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a submission against the quiz's question set.
///
/// Rejected outright (never recorded): a quiz with zero questions, an
/// answer referencing a question outside the quiz, a selected option not
/// belonging to its question, or two answers for the same question.
pub fn validate_answers(
    questions: &[ScorableQuestion],
    answers: &[SubmittedAnswer],
) -> Result<(), CoreError> {
    if questions.is_empty() {
        return Err(CoreError::Validation(
            "Quiz has no questions to submit answers for".into(),
        ));
    }

    let mut answered: HashSet<DbId> = HashSet::new();
    for answer in answers {
        let Some(question) = questions.iter().find(|q| q.id == answer.question_id) else {
            return Err(CoreError::Validation(format!(
                "Answer references question {} which does not belong to this quiz",
                answer.question_id
            )));
        };
        if !answered.insert(answer.question_id) {
            return Err(CoreError::Validation(format!(
                "Duplicate answer for question {}",
                answer.question_id
            )));
        }
        for option_id in &answer.selected_option_ids {
            if !question.options.iter().any(|o| o.id == *option_id) {
                return Err(CoreError::Validation(format!(
                    "Option {option_id} does not belong to question {}",
                    answer.question_id
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Validate and score a submission.
///
/// Score = 100 x earned points / total points, rounded to 2 decimals.
/// Unanswered questions earn zero. `passed = score >= passing_score`.
pub fn score_submission(
    questions: &[ScorableQuestion],
    answers: &[SubmittedAnswer],
    passing_score: f64,
) -> Result<ScoredSubmission, CoreError> {
    validate_answers(questions, answers)?;

    let total_points: i32 = questions.iter().map(|q| q.points.max(0)).sum();
    if total_points <= 0 {
        return Err(CoreError::Validation(
            "Quiz questions carry no point value".into(),
        ));
    }

    let mut results = Vec::with_capacity(questions.len());
    let mut earned: i32 = 0;
    let mut correct_answers = 0usize;

    for question in questions {
        let answer = answers.iter().find(|a| a.question_id == question.id);
        let correct = answer.is_some_and(|a| is_correct(question, a));
        let points_earned = if correct { question.points.max(0) } else { 0 };
        earned += points_earned;
        if correct {
            correct_answers += 1;
        }
        results.push(QuestionResult {
            question_id: question.id,
            correct,
            points_earned,
        });
    }

    let score = round2(f64::from(earned) / f64::from(total_points) * 100.0);
    Ok(ScoredSubmission {
        score,
        passed: score >= passing_score,
        correct_answers,
        total_questions: questions.len(),
        results,
    })
}

/// Exact-match correctness for one answered question.
fn is_correct(question: &ScorableQuestion, answer: &SubmittedAnswer) -> bool {
    match question.kind {
        QuestionKind::SingleChoice | QuestionKind::TrueFalse => {
            let [selected] = answer.selected_option_ids.as_slice() else {
                return false;
            };
            question
                .options
                .iter()
                .any(|o| o.id == *selected && o.is_correct)
        }
        QuestionKind::MultipleChoice => {
            let selected: HashSet<DbId> = answer.selected_option_ids.iter().copied().collect();
            let correct: HashSet<DbId> = question
                .options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.id)
                .collect();
            !correct.is_empty() && selected == correct
        }
        QuestionKind::FreeText => {
            let Some(text) = &answer.text_response else {
                return false;
            };
            let normalized = text.trim().to_lowercase();
            question
                .accepted_answers
                .iter()
                .any(|a| a.trim().to_lowercase() == normalized)
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Session state machine
// ---------------------------------------------------------------------------

/// Lifecycle of one quiz-taking view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizSessionState {
    NotStarted,
    InProgress,
    Submitted,
}

/// One quiz-taking session with an optional countdown.
///
/// The countdown is cooperative and single-threaded: the owner polls
/// [`QuizSession::poll_expiry`] on its tick cadence and must submit the
/// forced answers it returns. Expiry is not cancellable.
#[derive(Debug, Clone)]
pub struct QuizSession {
    state: QuizSessionState,
    started_at: Option<Timestamp>,
    time_limit_secs: Option<i32>,
    answers: Vec<SubmittedAnswer>,
}

impl QuizSession {
    pub fn new(time_limit_secs: Option<i32>) -> Self {
        Self {
            state: QuizSessionState::NotStarted,
            started_at: None,
            time_limit_secs,
            answers: Vec::new(),
        }
    }

    pub fn state(&self) -> QuizSessionState {
        self.state
    }

    pub fn answers(&self) -> &[SubmittedAnswer] {
        &self.answers
    }

    /// Begin the attempt; starts the countdown if a limit is defined.
    pub fn start(&mut self, now: Timestamp) -> Result<(), CoreError> {
        if self.state != QuizSessionState::NotStarted {
            return Err(CoreError::Conflict("Quiz session already started".into()));
        }
        self.state = QuizSessionState::InProgress;
        self.started_at = Some(now);
        Ok(())
    }

    /// Record or replace the answer for one question.
    pub fn record_answer(&mut self, answer: SubmittedAnswer) -> Result<(), CoreError> {
        if self.state != QuizSessionState::InProgress {
            return Err(CoreError::Conflict(
                "Cannot answer a quiz that is not in progress".into(),
            ));
        }
        self.answers.retain(|a| a.question_id != answer.question_id);
        self.answers.push(answer);
        Ok(())
    }

    /// When the countdown ends, if it does.
    pub fn deadline(&self) -> Option<Timestamp> {
        let limit = self.time_limit_secs?;
        let started = self.started_at?;
        Some(started + chrono::Duration::seconds(i64::from(limit)))
    }

    /// Seconds left on the countdown, floored at zero.
    pub fn remaining_secs(&self, now: Timestamp) -> Option<i64> {
        self.deadline().map(|d| (d - now).num_seconds().max(0))
    }

    /// Check the countdown; on expiry the session transitions to
    /// `Submitted` and the answers present at that instant are returned
    /// for a forced submission.
    pub fn poll_expiry(&mut self, now: Timestamp) -> Option<Vec<SubmittedAnswer>> {
        if self.state != QuizSessionState::InProgress {
            return None;
        }
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.state = QuizSessionState::Submitted;
        Some(self.answers.clone())
    }

    /// Elapsed seconds since the attempt started.
    pub fn time_taken_secs(&self, now: Timestamp) -> i32 {
        self.started_at
            .map(|s| (now - s).num_seconds().max(0) as i32)
            .unwrap_or(0)
    }

    /// Explicit submission by the learner.
    pub fn submit(&mut self) -> Result<Vec<SubmittedAnswer>, CoreError> {
        if self.state != QuizSessionState::InProgress {
            return Err(CoreError::Conflict(
                "Cannot submit a quiz that is not in progress".into(),
            ));
        }
        self.state = QuizSessionState::Submitted;
        Ok(std::mem::take(&mut self.answers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn t(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn choice_question(id: DbId, points: i32, correct_option: DbId) -> ScorableQuestion {
        ScorableQuestion {
            id,
            kind: QuestionKind::SingleChoice,
            points,
            options: vec![
                ScorableOption { id: correct_option, is_correct: true },
                ScorableOption { id: correct_option + 1, is_correct: false },
            ],
            accepted_answers: vec![],
        }
    }

    fn pick(question_id: DbId, option_id: DbId) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_option_ids: vec![option_id],
            text_response: None,
        }
    }

    #[test]
    fn test_score_is_percentage_of_points() {
        // 3 questions worth 1, 2, 1 points; answering the 2-pointer and
        // one 1-pointer correctly earns 3/4 = 75%.
        let questions = vec![
            choice_question(1, 1, 10),
            choice_question(2, 2, 20),
            choice_question(3, 1, 30),
        ];
        let answers = vec![pick(1, 10), pick(2, 20), pick(3, 31)];
        let scored = score_submission(&questions, &answers, 70.0).unwrap();
        assert_eq!(scored.score, 75.0);
        assert!(scored.passed);
        assert_eq!(scored.correct_answers, 2);
        assert_eq!(scored.total_questions, 3);
    }

    #[test]
    fn test_passed_iff_score_reaches_passing_score() {
        let questions = vec![choice_question(1, 1, 10), choice_question(2, 1, 20)];
        let half_right = vec![pick(1, 10), pick(2, 21)];
        let scored = score_submission(&questions, &half_right, 50.0).unwrap();
        assert_eq!(scored.score, 50.0);
        assert!(scored.passed);
        let scored = score_submission(&questions, &half_right, 50.01).unwrap();
        assert!(!scored.passed);
    }

    #[test]
    fn test_unanswered_questions_earn_zero() {
        let questions = vec![choice_question(1, 1, 10), choice_question(2, 1, 20)];
        let scored = score_submission(&questions, &[pick(1, 10)], 70.0).unwrap();
        assert_eq!(scored.score, 50.0);
        assert!(!scored.passed);
    }

    #[test]
    fn test_multiple_choice_requires_exact_option_set() {
        let question = ScorableQuestion {
            id: 1,
            kind: QuestionKind::MultipleChoice,
            points: 1,
            options: vec![
                ScorableOption { id: 10, is_correct: true },
                ScorableOption { id: 11, is_correct: true },
                ScorableOption { id: 12, is_correct: false },
            ],
            accepted_answers: vec![],
        };
        let exact = SubmittedAnswer {
            question_id: 1,
            selected_option_ids: vec![11, 10],
            text_response: None,
        };
        let partial = SubmittedAnswer {
            question_id: 1,
            selected_option_ids: vec![10],
            text_response: None,
        };
        let with_extra = SubmittedAnswer {
            question_id: 1,
            selected_option_ids: vec![10, 11, 12],
            text_response: None,
        };
        let questions = vec![question];
        assert_eq!(score_submission(&questions, &[exact], 100.0).unwrap().score, 100.0);
        assert_eq!(score_submission(&questions, &[partial], 100.0).unwrap().score, 0.0);
        assert_eq!(score_submission(&questions, &[with_extra], 100.0).unwrap().score, 0.0);
    }

    #[test]
    fn test_free_text_matching_is_trimmed_case_insensitive() {
        let question = ScorableQuestion {
            id: 1,
            kind: QuestionKind::FreeText,
            points: 1,
            options: vec![],
            accepted_answers: vec!["Paris".into(), "city of light".into()],
        };
        let answer = |text: &str| SubmittedAnswer {
            question_id: 1,
            selected_option_ids: vec![],
            text_response: Some(text.into()),
        };
        let questions = vec![question];
        assert!(score_submission(&questions, &[answer("  paris ")], 100.0).unwrap().passed);
        assert!(score_submission(&questions, &[answer("CITY OF LIGHT")], 100.0).unwrap().passed);
        assert!(!score_submission(&questions, &[answer("London")], 100.0).unwrap().passed);
    }

    #[test]
    fn test_zero_question_quiz_is_rejected() {
        let err = score_submission(&[], &[], 70.0).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn test_answer_for_foreign_question_is_rejected() {
        let questions = vec![choice_question(1, 1, 10)];
        let err = validate_answers(&questions, &[pick(99, 10)]).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn test_foreign_option_is_rejected() {
        let questions = vec![choice_question(1, 1, 10), choice_question(2, 1, 20)];
        // Option 20 belongs to question 2, not question 1.
        let err = validate_answers(&questions, &[pick(1, 20)]).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn test_duplicate_answer_is_rejected() {
        let questions = vec![choice_question(1, 1, 10)];
        let err = validate_answers(&questions, &[pick(1, 10), pick(1, 11)]).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn test_countdown_expiry_forces_submission() {
        let mut session = QuizSession::new(Some(60));
        session.start(t(0)).unwrap();
        session.record_answer(pick(1, 10)).unwrap();
        assert_eq!(session.remaining_secs(t(30)), Some(30));
        assert_eq!(session.poll_expiry(t(59)), None);
        let forced = session.poll_expiry(t(60)).expect("expired");
        assert_eq!(forced.len(), 1);
        assert_eq!(session.state(), QuizSessionState::Submitted);
        // Expiry is terminal; nothing further can be recorded.
        assert!(session.record_answer(pick(1, 11)).is_err());
        assert!(session.submit().is_err());
    }

    #[test]
    fn test_untimed_session_never_expires() {
        let mut session = QuizSession::new(None);
        session.start(t(0)).unwrap();
        assert_eq!(session.deadline(), None);
        assert_eq!(session.poll_expiry(t(1_000_000)), None);
    }

    #[test]
    fn test_answer_replacement_keeps_last() {
        let mut session = QuizSession::new(None);
        session.start(t(0)).unwrap();
        session.record_answer(pick(1, 10)).unwrap();
        session.record_answer(pick(1, 11)).unwrap();
        let submitted = session.submit().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].selected_option_ids, vec![11]);
    }

    #[test]
    fn test_double_start_is_a_conflict() {
        let mut session = QuizSession::new(None);
        session.start(t(0)).unwrap();
        assert_matches!(session.start(t(1)), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn test_question_kind_round_trip() {
        for kind in [
            QuestionKind::SingleChoice,
            QuestionKind::MultipleChoice,
            QuestionKind::TrueFalse,
            QuestionKind::FreeText,
        ] {
            assert_eq!(QuestionKind::from_str_value(kind.as_str()), Ok(kind));
        }
        assert!(QuestionKind::from_str_value("essay").is_err());
    }
}
