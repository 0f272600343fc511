//! Repository for the `detection_events` table.
//!
//! The log is append-only: events are never updated in place. The only
//! mutation besides insert is the user-scoped bulk delete.

use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::detection_event::{CreateDetectionEvent, DetectionEvent};

const COLUMNS: &str = "id, username, recorded_at, source, confidence_threshold, \
                       class_counts, total, raw_detections, file_name";

/// Provides append/query operations for detection history.
pub struct DetectionLogRepo;

impl DetectionLogRepo {
    /// Append one detection event, returning the created row.
    pub async fn append(
        pool: &PgPool,
        input: &CreateDetectionEvent,
    ) -> Result<DetectionEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO detection_events
                (username, source, confidence_threshold, class_counts, total,
                 raw_detections, file_name)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DetectionEvent>(&query)
            .bind(&input.username)
            .bind(input.source.as_str())
            .bind(input.confidence_threshold)
            .bind(Json(&input.class_counts))
            .bind(input.total())
            .bind(Json(&input.raw_detections))
            .bind(&input.file_name)
            .fetch_one(pool)
            .await
    }

    /// A user's events, most recent first, capped at `limit`.
    pub async fn list_by_user(
        pool: &PgPool,
        username: &str,
        limit: i64,
    ) -> Result<Vec<DetectionEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM detection_events
             WHERE username = $1
             ORDER BY recorded_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, DetectionEvent>(&query)
            .bind(username)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The single most recent event for a user, or `None`.
    pub async fn latest_by_user(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<DetectionEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM detection_events
             WHERE username = $1
             ORDER BY recorded_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, DetectionEvent>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Total number of events for a user.
    pub async fn count_by_user(pool: &PgPool, username: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM detection_events WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Remove all events for a user. Returns the number of rows deleted.
    pub async fn delete_by_user(pool: &PgPool, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM detection_events WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
