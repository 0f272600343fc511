//! Shared domain types for the AgriVision backend.
//!
//! - [`types`] -- database id and timestamp aliases.
//! - [`error`] -- domain-level error taxonomy.
//! - [`detection`] -- bounding boxes, detection records, per-class counts.

pub mod detection;
pub mod error;
pub mod types;
