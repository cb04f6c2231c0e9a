//! HTTP-level tests for the video completion endpoints: merge
//! semantics, authentication, scoping, and input validation.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

fn tracker_push(watch: f64, completed: bool) -> serde_json::Value {
    serde_json::json!({
        "watch_time_seconds": watch,
        "total_time_seconds": 120.0,
        "last_position_seconds": watch,
        "completed": completed,
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_returns_null_before_first_report(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[1]).await;
    let lesson = course.all_lessons()[0];

    let app = common::build_test_app(pool);
    let response = common::get(app, user, &format!("/api/v1/lessons/{lesson}/video-completion")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_json(response).await["data"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_merge_is_monotonic_over_http(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[1]).await;
    common::enroll(&pool, user, course.course_id).await;
    let lesson = course.all_lessons()[0];
    let uri = format!("/api/v1/lessons/{lesson}/video-completion");

    let app = common::build_test_app(pool.clone());
    let response = common::put_json(app, user, &uri, tracker_push(40.0, true)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // A stale tab reports less progress and no completion.
    let app = common::build_test_app(pool.clone());
    let response = common::put_json(app, user, &uri, tracker_push(25.0, false)).await;
    let json = common::body_json(response).await;
    assert_eq!(json["data"]["watch_time_seconds"], 40.0);
    assert_eq!(json["data"]["completed"], true);
    assert_eq!(json["data"]["last_position_seconds"], 25.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_requires_enrollment(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[1]).await;
    let lesson = course.all_lessons()[0];

    let app = common::build_test_app(pool);
    let response = common::put_json(
        app,
        user,
        &format!("/api/v1/lessons/{lesson}/video-completion"),
        tracker_push(10.0, false),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_lesson_is_404(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;

    let app = common::build_test_app(pool.clone());
    let response =
        common::get(app, user, "/api/v1/lessons/999999/video-completion").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = common::put_json(
        app,
        user,
        "/api/v1/lessons/999999/video-completion",
        tracker_push(10.0, false),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_watch_time_is_rejected(pool: PgPool) {
    let user = common::seed_user(&pool, "a@test.local").await;
    let course = common::seed_course(&pool, &[1]).await;
    common::enroll(&pool, user, course.course_id).await;
    let lesson = course.all_lessons()[0];

    let app = common::build_test_app(pool);
    let response = common::put_json(
        app,
        user,
        &format!("/api/v1/lessons/{lesson}/video-completion"),
        tracker_push(-5.0, false),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_token_is_401(pool: PgPool) {
    let course = common::seed_course(&pool, &[1]).await;
    let lesson = course.all_lessons()[0];

    let app = common::build_test_app(pool);
    let response =
        common::get_anonymous(app, &format!("/api/v1/lessons/{lesson}/video-completion")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
