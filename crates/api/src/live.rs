//! Registry of running live capture sessions.

use std::collections::HashMap;

use tokio::sync::Mutex;
use uuid::Uuid;

use agrivision_pipeline::LiveSession;

/// One user's running capture, tagged with a display id.
pub struct RunningLive {
    pub id: Uuid,
    /// Confidence threshold the session was started with.
    pub conf: f32,
    pub session: LiveSession,
}

/// At most one live session per user, keyed by username.
#[derive(Default)]
pub struct LiveSessions {
    inner: Mutex<HashMap<String, RunningLive>>,
}

impl LiveSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for `username`. Returns the session back as an
    /// error when one is already running.
    pub async fn insert(
        &self,
        username: &str,
        running: RunningLive,
    ) -> Result<(), RunningLive> {
        let mut map = self.inner.lock().await;
        if map.contains_key(username) {
            return Err(running);
        }
        map.insert(username.to_string(), running);
        Ok(())
    }

    /// Remove and return the session for `username`, if any.
    pub async fn take(&self, username: &str) -> Option<RunningLive> {
        self.inner.lock().await.remove(username)
    }

    pub async fn is_running(&self, username: &str) -> bool {
        self.inner.lock().await.contains_key(username)
    }
}
