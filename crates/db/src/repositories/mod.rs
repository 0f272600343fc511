//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod chat_log_repo;
pub mod detection_log_repo;
pub mod session_repo;
pub mod user_repo;

pub use chat_log_repo::ChatLogRepo;
pub use detection_log_repo::DetectionLogRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
