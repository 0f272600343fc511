//! Row models and DTOs for every table.

pub mod chat_message;
pub mod detection_event;
pub mod session;
pub mod user;
