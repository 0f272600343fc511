//! Domain-level error taxonomy.
//!
//! [`AuthError`] covers every credential-store failure mode; [`CoreError`]
//! is the catch-all for the remaining domain failures. HTTP status mapping
//! lives in the API crate, not here.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure modes of the credential store operations.
///
/// Messages are the user-facing strings returned by the auth endpoints.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("Email is already in use by another account")]
    DuplicateEmail,

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("No fields supplied to update")]
    NothingToUpdate,

    #[error("User not found")]
    UserNotFound,

    #[error("Incorrect password")]
    BadPassword,
}
