//! End-to-end tests for the completion aggregator: lesson truth
//! re-derivation, hierarchy consistency, idempotence, and the
//! certificate side effect on the course-completion transition.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

fn progress_body(lesson_id: i64, completed: bool) -> serde_json::Value {
    serde_json::json!({ "lesson_id": lesson_id, "completed": completed })
}

async fn update_progress(
    pool: &PgPool,
    user: i64,
    course_id: i64,
    lesson_id: i64,
    completed: bool,
) -> (StatusCode, serde_json::Value) {
    let app = common::build_test_app(pool.clone());
    let response = common::post_json(
        app,
        user,
        &format!("/api/v1/courses/{course_id}/progress"),
        progress_body(lesson_id, completed),
    )
    .await;
    let status = response.status();
    let json = common::body_json(response).await;
    (status, json)
}

// ---------------------------------------------------------------------------
// Lesson without a quiz
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_video_only_lesson_completes_lesson_and_unit(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    // One unit whose only lesson is the one under test.
    let course = common::seed_course(&pool, &[1, 2]).await;
    common::enroll(&pool, user, course.course_id).await;
    let lesson = course.lesson_ids[0][0];

    // Tracker reported 100s of a 120s video: past the 80% threshold.
    common::complete_video(&pool, user, lesson).await;

    let (status, json) = update_progress(&pool, user, course.course_id, lesson, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["lesson_completed"], true);
    assert_eq!(json["data"]["unit_completed"], true);
    assert_eq!(json["data"]["course_completed"], false);
    // 1 of 3 lessons.
    assert_eq!(json["data"]["progress_percentage"], 33.33);
    assert_eq!(json["data"]["progress"]["current_lesson_id"], lesson);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unverifiable_assertion_is_rejected_before_any_write(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[2]).await;
    common::enroll(&pool, user, course.course_id).await;
    let lesson = course.lesson_ids[0][0];

    // No video report exists; the claim cannot be verified.
    let (status, json) = update_progress(&pool, user, course.course_id, lesson, true).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    // No partial update was persisted.
    let app = common::build_test_app(pool);
    let response = common::get(
        app,
        user,
        &format!("/api/v1/courses/{}/progress", course.course_id),
    )
    .await;
    assert!(common::body_json(response).await["data"].is_null());
}

// ---------------------------------------------------------------------------
// Lesson with a quiz: latest attempt governs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_quiz_lesson_requires_latest_attempt_passed(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[1]).await;
    common::enroll(&pool, user, course.course_id).await;
    let lesson = course.lesson_ids[0][0];
    let quiz = common::seed_quiz(&pool, lesson, 70.0).await;

    common::complete_video(&pool, user, lesson).await;

    // Attempt #1: 50% -- fail. Lesson stays incomplete.
    let submissions_uri = format!("/api/v1/quizzes/{}/submissions", quiz.quiz_id);
    let app = common::build_test_app(pool.clone());
    common::post_json(
        app,
        user,
        &submissions_uri,
        serde_json::json!({"answers": [
            {"question_id": quiz.question_ids[0], "selected_option_ids": [quiz.correct_option_ids[0]]},
            {"question_id": quiz.question_ids[1], "selected_option_ids": [quiz.wrong_option_ids[1]]},
        ]}),
    )
    .await;

    let (status, _) = update_progress(&pool, user, course.course_id, lesson, true).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, json) = update_progress(&pool, user, course.course_id, lesson, false).await;
    assert_eq!(json["data"]["lesson_completed"], false);

    // Attempt #2: 100% -- pass. The latest attempt governs.
    let app = common::build_test_app(pool.clone());
    common::post_json(
        app,
        user,
        &submissions_uri,
        serde_json::json!({"answers": [
            {"question_id": quiz.question_ids[0], "selected_option_ids": [quiz.correct_option_ids[0]]},
            {"question_id": quiz.question_ids[1], "selected_option_ids": [quiz.correct_option_ids[1]]},
        ]}),
    )
    .await;

    let (status, json) = update_progress(&pool, user, course.course_id, lesson, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["lesson_completed"], true);
    assert_eq!(json["data"]["course_completed"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failing_retake_revokes_lesson_completion(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[2]).await;
    common::enroll(&pool, user, course.course_id).await;
    let lesson = course.lesson_ids[0][0];
    let quiz = common::seed_quiz(&pool, lesson, 70.0).await;

    common::complete_video(&pool, user, lesson).await;
    let submissions_uri = format!("/api/v1/quizzes/{}/submissions", quiz.quiz_id);
    let pass = serde_json::json!({"answers": [
        {"question_id": quiz.question_ids[0], "selected_option_ids": [quiz.correct_option_ids[0]]},
        {"question_id": quiz.question_ids[1], "selected_option_ids": [quiz.correct_option_ids[1]]},
    ]});
    let fail = serde_json::json!({"answers": [
        {"question_id": quiz.question_ids[0], "selected_option_ids": [quiz.wrong_option_ids[0]]},
        {"question_id": quiz.question_ids[1], "selected_option_ids": [quiz.wrong_option_ids[1]]},
    ]});

    let app = common::build_test_app(pool.clone());
    common::post_json(app, user, &submissions_uri, pass).await;
    let (_, json) = update_progress(&pool, user, course.course_id, lesson, true).await;
    assert_eq!(json["data"]["lesson_completed"], true);

    // A later failing retake takes the lesson back out of the set on
    // the next recompute.
    let app = common::build_test_app(pool.clone());
    common::post_json(app, user, &submissions_uri, fail).await;
    let (_, json) = update_progress(&pool, user, course.course_id, lesson, false).await;
    assert_eq!(json["data"]["lesson_completed"], false);
    assert_eq!(json["data"]["progress_percentage"], 0.0);
}

// ---------------------------------------------------------------------------
// Hierarchy and the completion transition
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_four_lesson_course_completes_and_issues_certificate(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    // 2 units / 4 lessons total.
    let course = common::seed_course(&pool, &[2, 2]).await;
    common::enroll(&pool, user, course.course_id).await;
    let lessons = course.all_lessons();

    for lesson in &lessons[..3] {
        common::complete_video(&pool, user, *lesson).await;
        let (status, _) = update_progress(&pool, user, course.course_id, *lesson, true).await;
        assert_eq!(status, StatusCode::OK);
    }

    let app = common::build_test_app(pool.clone());
    let response = common::get(
        app,
        user,
        &format!("/api/v1/courses/{}/progress", course.course_id),
    )
    .await;
    let json = common::body_json(response).await;
    assert_eq!(json["data"]["progress_percent"], 75.0);
    assert_eq!(json["data"]["completed"], false);

    // The 4th lesson completes the course and clears the resume
    // pointers.
    common::complete_video(&pool, user, lessons[3]).await;
    let (_, json) = update_progress(&pool, user, course.course_id, lessons[3], true).await;
    assert_eq!(json["data"]["course_completed"], true);
    assert_eq!(json["data"]["progress_percentage"], 100.0);
    assert!(json["data"]["progress"]["current_lesson_id"].is_null());
    assert!(json["data"]["progress"]["current_unit_id"].is_null());

    // The transition issued the certificate; two explicit requests from
    // two tabs both return the same identity.
    let uri = format!("/api/v1/courses/{}/certificate", course.course_id);
    let app = common::build_test_app(pool.clone());
    let first = common::body_json(common::post_empty(app, user, &uri).await).await;
    let app = common::build_test_app(pool.clone());
    let second = common::body_json(common::post_empty(app, user, &uri).await).await;
    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(first["data"]["code"], second["data"]["code"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_is_idempotent(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[2]).await;
    common::enroll(&pool, user, course.course_id).await;
    let lesson = course.lesson_ids[0][0];
    common::complete_video(&pool, user, lesson).await;

    let (_, first) = update_progress(&pool, user, course.course_id, lesson, true).await;
    let (_, second) = update_progress(&pool, user, course.course_id, lesson, true).await;

    assert_eq!(
        first["data"]["progress"]["completed_lesson_ids"],
        second["data"]["progress"]["completed_lesson_ids"]
    );
    assert_eq!(
        first["data"]["progress"]["completed_unit_ids"],
        second["data"]["progress"]["completed_unit_ids"]
    );
    assert_eq!(
        first["data"]["progress"]["progress_percent"],
        second["data"]["progress"]["progress_percent"]
    );
    assert_eq!(first["data"]["progress"]["id"], second["data"]["progress"]["id"]);
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unenrolled_user_is_forbidden(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[1]).await;
    let lesson = course.all_lessons()[0];

    let (status, json) = update_progress(&pool, user, course.course_id, lesson, false).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lesson_outside_course_is_404(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[1]).await;
    let other = common::seed_course(&pool, &[1]).await;
    common::enroll(&pool, user, course.course_id).await;

    // A real lesson, but belonging to a different course.
    let (status, json) =
        update_progress(&pool, user, course.course_id, other.all_lessons()[0], false).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
