//! HTTP-level integration tests for the chat endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, register_and_login};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn chat_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "message": "hello" });
    let response = post_json_auth(app, "/api/v1/chat", "bad-token", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn chat_replies_inline_and_persists_the_exchange(pool: PgPool) {
    // Test state has no narrator configured, so the reply is the inline
    // unavailability text; it must still be persisted like a normal turn.
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "bao").await;

    let body = serde_json::json!({ "message": "when should I harvest?" });
    let response = post_json_auth(app.clone(), "/api/v1/chat", &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let reply = json["reply"].as_str().unwrap().to_string();
    assert!(reply.contains("unavailable"));

    let response = get_auth(app.clone(), "/api/v1/chat/history", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    let history = history.as_array().unwrap().clone();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["user_message"], "when should I harvest?");
    assert_eq!(history[0]["assistant_reply"], reply.as_str());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn chat_rejects_blank_messages(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "bao").await;

    let body = serde_json::json!({ "message": "   " });
    let response = post_json_auth(app.clone(), "/api/v1/chat", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn chat_history_is_oldest_first_and_per_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token_bao = register_and_login(&app, "bao").await;
    let token_other = register_and_login(&app, "other").await;

    for i in 0..3 {
        let body = serde_json::json!({ "message": format!("question {i}") });
        let response = post_json_auth(app.clone(), "/api/v1/chat", &token_bao, body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(app.clone(), "/api/v1/chat/history", &token_bao).await;
    let history = body_json(response).await;
    let history = history.as_array().unwrap().clone();
    assert_eq!(history.len(), 3);
    // Conversation order: oldest first.
    assert_eq!(history[0]["user_message"], "question 0");
    assert_eq!(history[2]["user_message"], "question 2");

    let response = get_auth(app.clone(), "/api/v1/chat/history", &token_other).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn clearing_history_is_scoped_to_the_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token_bao = register_and_login(&app, "bao").await;
    let token_other = register_and_login(&app, "other").await;

    for token in [&token_bao, &token_other] {
        let body = serde_json::json!({ "message": "hello" });
        let response = post_json_auth(app.clone(), "/api/v1/chat", token, body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = delete_auth(app.clone(), "/api/v1/chat/history", &token_bao).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), "/api/v1/chat/history", &token_bao).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let response = get_auth(app.clone(), "/api/v1/chat/history", &token_other).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}
