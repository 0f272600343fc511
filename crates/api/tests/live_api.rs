//! HTTP-level tests for the live session endpoints that do not need a
//! camera. The capture/inference loop itself is covered by the pipeline
//! crate's tests.

mod common;

use axum::http::StatusCode;
use common::{post_auth, register_and_login};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn live_endpoints_require_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_auth(app.clone(), "/api/v1/live/start", "bad-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = post_auth(app.clone(), "/api/v1/live/stop", "bad-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stopping_without_a_running_session_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "bao").await;

    let response = post_auth(app.clone(), "/api/v1/live/stop", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
