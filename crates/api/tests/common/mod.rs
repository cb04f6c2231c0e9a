//! Shared harness for HTTP-level integration tests.
//!
//! Builds the production router via `build_app_router` so tests
//! exercise the same middleware stack (CORS, request ID, timeout,
//! tracing, panic recovery) that production uses, and provides request
//! helpers plus catalog seeding.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use lernix_api::auth::jwt::{generate_access_token, JwtConfig};
use lernix_api::config::ServerConfig;
use lernix_api::documents::CdnDocumentStore;
use lernix_api::router::build_app_router;
use lernix_api::state::AppState;
use lernix_db::models::course::{CreateCourse, CreateCourseUnit, CreateLesson};
use lernix_db::models::quiz::{CreateQuiz, CreateQuizOption, CreateQuizQuestion};
use lernix_db::models::user::CreateUser;
use lernix_db::repositories::{CourseRepo, EnrollmentRepo, QuizRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        certificate_base_url: "https://cdn.test.local/certificates".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(lernix_events::EventBus::default()),
        documents: Arc::new(CdnDocumentStore::new(config.certificate_base_url.clone())),
    };
    build_app_router(state, &config)
}

/// Mint a Bearer token for a test user.
pub fn bearer(user_id: i64) -> String {
    let token = generate_access_token(user_id, "learner", &test_config().jwt)
        .expect("token generation should succeed");
    format!("Bearer {token}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    user_id: Option<i64>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(header::AUTHORIZATION, bearer(user_id));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Authenticated GET.
pub async fn get(app: Router, user_id: i64, uri: &str) -> Response {
    send(app, Method::GET, uri, Some(user_id), None).await
}

/// Unauthenticated GET.
pub async fn get_anonymous(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

/// Authenticated POST with a JSON body.
pub async fn post_json(app: Router, user_id: i64, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(user_id), Some(body)).await
}

/// Authenticated POST without a body.
pub async fn post_empty(app: Router, user_id: i64, uri: &str) -> Response {
    send(app, Method::POST, uri, Some(user_id), None).await
}

/// Authenticated PUT with a JSON body.
pub async fn put_json(app: Router, user_id: i64, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(user_id), Some(body)).await
}

/// Deserialize a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Catalog seeding
// ---------------------------------------------------------------------------

/// A seeded catalog: one course, its units, and their lessons.
pub struct SeededCourse {
    pub course_id: i64,
    pub unit_ids: Vec<i64>,
    /// Lesson ids grouped by unit, in catalog order.
    pub lesson_ids: Vec<Vec<i64>>,
}

impl SeededCourse {
    /// All lesson ids in catalog order.
    pub fn all_lessons(&self) -> Vec<i64> {
        self.lesson_ids.iter().flatten().copied().collect()
    }
}

pub async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser { email: email.to_string(), display_name: "Test Learner".to_string() },
    )
    .await
    .unwrap()
    .id
}

/// Create a course with the given unit shapes (`lessons_per_unit[i]`
/// lessons in unit `i`), each lesson a 120s video.
pub async fn seed_course(pool: &PgPool, lessons_per_unit: &[usize]) -> SeededCourse {
    let course = CourseRepo::create(
        pool,
        &CreateCourse { title: "Test Course".to_string(), description: None },
    )
    .await
    .unwrap();

    let mut unit_ids = Vec::new();
    let mut lesson_ids = Vec::new();
    for (ui, count) in lessons_per_unit.iter().enumerate() {
        let unit = CourseRepo::create_unit(
            pool,
            &CreateCourseUnit {
                course_id: course.id,
                title: format!("Unit {}", ui + 1),
                sort_order: ui as i32,
            },
        )
        .await
        .unwrap();
        let mut unit_lessons = Vec::new();
        for li in 0..*count {
            let lesson = CourseRepo::create_lesson(
                pool,
                &CreateLesson {
                    unit_id: unit.id,
                    title: format!("Lesson {}.{}", ui + 1, li + 1),
                    sort_order: li as i32,
                    video_url: Some("https://video.test.local/v.mp4".to_string()),
                    video_duration_secs: Some(120.0),
                },
            )
            .await
            .unwrap();
            unit_lessons.push(lesson.id);
        }
        unit_ids.push(unit.id);
        lesson_ids.push(unit_lessons);
    }

    SeededCourse { course_id: course.id, unit_ids, lesson_ids }
}

pub async fn enroll(pool: &PgPool, user_id: i64, course_id: i64) {
    EnrollmentRepo::enroll(pool, user_id, course_id).await.unwrap();
}

/// A seeded quiz: two single-choice questions, one point each. Option
/// ids are returned as (correct, wrong) pairs per question.
pub struct SeededQuiz {
    pub quiz_id: i64,
    pub question_ids: Vec<i64>,
    pub correct_option_ids: Vec<i64>,
    pub wrong_option_ids: Vec<i64>,
}

/// Attach a two-question quiz to a lesson (passing score 70 by default).
pub async fn seed_quiz(pool: &PgPool, lesson_id: i64, passing_score: f64) -> SeededQuiz {
    let quiz = QuizRepo::create(
        pool,
        &CreateQuiz {
            lesson_id,
            title: "Checkpoint Quiz".to_string(),
            passing_score,
            time_limit_secs: None,
        },
    )
    .await
    .unwrap();

    let mut question_ids = Vec::new();
    let mut correct_option_ids = Vec::new();
    let mut wrong_option_ids = Vec::new();
    for i in 0..2 {
        let question = QuizRepo::create_question(
            pool,
            &CreateQuizQuestion {
                quiz_id: quiz.id,
                kind: "single_choice".to_string(),
                prompt: format!("Question {}", i + 1),
                points: 1,
                sort_order: i,
                accepted_answers: serde_json::json!([]),
            },
        )
        .await
        .unwrap();
        let correct = QuizRepo::create_option(
            pool,
            &CreateQuizOption {
                question_id: question.id,
                label: "Right".to_string(),
                is_correct: true,
                sort_order: 0,
            },
        )
        .await
        .unwrap();
        let wrong = QuizRepo::create_option(
            pool,
            &CreateQuizOption {
                question_id: question.id,
                label: "Wrong".to_string(),
                is_correct: false,
                sort_order: 1,
            },
        )
        .await
        .unwrap();
        question_ids.push(question.id);
        correct_option_ids.push(correct.id);
        wrong_option_ids.push(wrong.id);
    }

    SeededQuiz { quiz_id: quiz.id, question_ids, correct_option_ids, wrong_option_ids }
}

/// Push a completed video report for a lesson via the API.
pub async fn complete_video(pool: &PgPool, user_id: i64, lesson_id: i64) {
    let app = build_test_app(pool.clone());
    let response = put_json(
        app,
        user_id,
        &format!("/api/v1/lessons/{lesson_id}/video-completion"),
        serde_json::json!({
            "watch_time_seconds": 100.0,
            "total_time_seconds": 120.0,
            "last_position_seconds": 100.0,
            "completed": true,
        }),
    )
    .await;
    assert!(response.status().is_success());
}
