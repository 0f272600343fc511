//! Integration tests for the user and session repositories.
//!
//! Exercises uniqueness constraints, the atomic profile update, and
//! session issue/revoke against a real database.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use agrivision_db::models::session::CreateSession;
use agrivision_db::models::user::{CreateUser, UpdateUser};
use agrivision_db::repositories::{SessionRepo, UserRepo};

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: "$argon2id$fake-hash".to_string(),
    }
}

#[sqlx::test]
async fn create_and_find_user(pool: PgPool) {
    let created = UserRepo::create(&pool, &new_user("bao")).await.unwrap();
    assert_eq!(created.username, "bao");
    assert_eq!(created.email, "bao@test.com");
    assert!(created.last_login_at.is_none());
    assert!(created.updated_at.is_none());

    let found = UserRepo::find_by_username(&pool, "bao")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(found.id, created.id);

    // Lookups are case-sensitive.
    assert!(UserRepo::find_by_username(&pool, "Bao").await.unwrap().is_none());
}

#[sqlx::test]
async fn duplicate_username_violates_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dup")).await.unwrap();

    let mut second = new_user("dup");
    second.email = "other@test.com".to_string();
    let err = UserRepo::create(&pool, &second).await.unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_users_username"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[sqlx::test]
async fn profile_update_is_single_statement(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("edit")).await.unwrap();

    let input = UpdateUser {
        username: Some("edited".to_string()),
        email: None,
        password_hash: Some("$argon2id$new-hash".to_string()),
    };
    let updated = UserRepo::update_profile(&pool, user.id, &input)
        .await
        .unwrap()
        .expect("row should exist");

    assert_eq!(updated.username, "edited");
    // Untouched field keeps its value.
    assert_eq!(updated.email, "edit@test.com");
    assert_eq!(updated.password_hash, "$argon2id$new-hash");
    assert!(updated.updated_at.is_some(), "updated_at must be set on edit");
}

#[sqlx::test]
async fn record_login_sets_last_login(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("login")).await.unwrap();
    UserRepo::record_login(&pool, user.id).await.unwrap();

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(reloaded.last_login_at.is_some());
}

#[sqlx::test]
async fn session_lifecycle(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("sess")).await.unwrap();

    let session = SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: user.id,
            token_hash: "a".repeat(64),
            expires_at: Utc::now() + Duration::hours(12),
        },
    )
    .await
    .unwrap();

    let found = SessionRepo::find_active_by_token_hash(&pool, &"a".repeat(64))
        .await
        .unwrap()
        .expect("live session should resolve");
    assert_eq!(found.user_id, user.id);

    assert!(SessionRepo::revoke(&pool, session.id).await.unwrap());
    assert!(
        SessionRepo::find_active_by_token_hash(&pool, &"a".repeat(64))
            .await
            .unwrap()
            .is_none(),
        "revoked session must not resolve"
    );
}

#[sqlx::test]
async fn expired_session_does_not_resolve(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("expired")).await.unwrap();

    SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: user.id,
            token_hash: "b".repeat(64),
            expires_at: Utc::now() - Duration::hours(1),
        },
    )
    .await
    .unwrap();

    assert!(
        SessionRepo::find_active_by_token_hash(&pool, &"b".repeat(64))
            .await
            .unwrap()
            .is_none()
    );
}
