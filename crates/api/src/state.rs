use std::sync::Arc;

use sqlx::PgPool;

use agrivision_detector::ObjectDetector;
use agrivision_narrator::Narrator;

use crate::config::ServerConfig;
use crate::live::LiveSessions;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Detection engine, loaded once at startup.
    pub detector: Arc<dyn ObjectDetector>,
    /// Generative text client; `None` when no API key is configured.
    pub narrator: Option<Arc<Narrator>>,
    /// Running live capture sessions, one per user at most.
    pub live: Arc<LiveSessions>,
}
