//! Password hashing and session token primitives.

pub mod password;
pub mod session;
