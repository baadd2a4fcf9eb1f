use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Timestamp layout matching a US-English locale string, e.g.
/// `3/1/2024, 7:30:00 AM`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Reject layouts chrono cannot render, such as `%Q` or an empty string.
pub fn check_timestamp_format(format: &str) -> Result<(), ValidationError> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ValidationError::InvalidValue {
            field: "timestamp_format".into(),
            message: format!("'{format}' is not a valid strftime format"),
        });
    }
    Ok(())
}

/// Render `at` in local time, falling back to the default layout when
/// `format` cannot be rendered.
fn render_timestamp(at: DateTime<Utc>, format: &str) -> String {
    let local = at.with_timezone(&Local);
    let mut label = String::new();
    if write!(label, "{}", local.format(format)).is_ok() {
        return label;
    }
    tracing::warn!(format, "unrenderable timestamp format, using default");
    local.format(DEFAULT_TIMESTAMP_FORMAT).to_string()
}

/// One completed meditation session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    timestamp: String,
    completed_at: DateTime<Utc>,
    duration_minutes: u32,
    note: String,
}

impl SessionRecord {
    /// Build a record, rendering the label in local time with `format`.
    ///
    /// A layout chrono cannot render falls back to
    /// [`DEFAULT_TIMESTAMP_FORMAT`] instead of panicking.
    pub fn new(
        completed_at: DateTime<Utc>,
        duration_minutes: u32,
        note: impl Into<String>,
        format: &str,
    ) -> Self {
        Self {
            timestamp: render_timestamp(completed_at, format),
            completed_at,
            duration_minutes,
            note: note.into(),
        }
    }

    /// Human-readable completion time captured at creation.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// One-line description, e.g. `5 minutes on 3/1/2024, 7:30:00 AM`.
    pub fn summary(&self) -> String {
        format!("{} minutes on {}", self.duration_minutes, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn label_is_rendered_once_at_creation() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 7, 30, 0).unwrap();
        let record = SessionRecord::new(at, 10, "calm", "%Y");
        assert_eq!(record.timestamp(), "2024");
        assert_eq!(record.completed_at(), at);
        assert_eq!(record.duration_minutes(), 10);
        assert_eq!(record.note(), "calm");
        assert_eq!(record.summary(), "10 minutes on 2024");
    }

    #[test]
    fn unrenderable_format_falls_back_to_default() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 7, 30, 0).unwrap();
        let record = SessionRecord::new(at, 5, "", "%Q");
        let expected = SessionRecord::new(at, 5, "", DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(record.timestamp(), expected.timestamp());
    }

    #[test]
    fn check_timestamp_format_accepts_and_rejects() {
        assert!(check_timestamp_format(DEFAULT_TIMESTAMP_FORMAT).is_ok());
        assert!(check_timestamp_format("%Y-%m-%d").is_ok());
        assert!(check_timestamp_format("%Q").is_err());
        assert!(check_timestamp_format("").is_err());
    }

    #[test]
    fn default_format_has_date_and_meridiem() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 7, 30, 0).unwrap();
        let record = SessionRecord::new(at, 5, "", DEFAULT_TIMESTAMP_FORMAT);
        assert!(record.timestamp().contains("/2024, "));
        assert!(record.timestamp().ends_with("AM") || record.timestamp().ends_with("PM"));
        assert!(record.note().is_empty());
    }
}
