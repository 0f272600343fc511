/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Format a timestamp for display in API responses (`dd/mm/yyyy hh:mm`).
///
/// Matches the format the account pages present to users.
pub fn format_display_timestamp(ts: Timestamp) -> String {
    ts.format("%d/%m/%Y %H:%M").to_string()
}
