use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Session-unique id, never reused
    pub id: u64,
    /// Trimmed, non-empty task text
    pub text: String,
    pub completed: bool,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new, incomplete task stamped with the current time
    pub fn new(id: u64, text: String) -> Self {
        Task {
            id,
            text,
            completed: false,
            created_at: now(),
        }
    }
}

/// Current time truncated to the millisecond precision we persist.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp as `2024-01-01T00:00:00.000Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
