use serde::{Deserialize, Serialize};

use super::record::SessionRecord;
use crate::error::ValidationError;

/// A logged session as shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Position to pass to `delete`.
    pub index: usize,
    pub summary: String,
    pub record: SessionRecord,
}

/// Completed sessions, newest first.
///
/// Indices are positions, not identifiers: deleting a record shifts every
/// later one down by one.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SessionLog {
    records: Vec<SessionRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `record` at the front of the log.
    pub fn append(&mut self, record: SessionRecord) {
        tracing::info!(
            minutes = record.duration_minutes(),
            total = self.records.len() + 1,
            "session logged"
        );
        self.records.insert(0, record);
    }

    /// Remove the record at `index`, keeping the others in order.
    ///
    /// An index past the end leaves the log untouched.
    pub fn delete_at(&mut self, index: usize) -> Result<SessionRecord, ValidationError> {
        if index >= self.records.len() {
            tracing::warn!(index, len = self.records.len(), "delete ignored, no such session");
            return Err(ValidationError::OutOfBounds {
                collection: "sessions".into(),
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    pub fn list(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SessionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records paired with their current position and summary line.
    pub fn entries(&self) -> Vec<SessionEntry> {
        self.iter()
            .enumerate()
            .map(|(index, record)| SessionEntry {
                index,
                summary: record.summary(),
                record: record.clone(),
            })
            .collect()
    }

    /// Minutes meditated across every logged session.
    pub fn total_minutes(&self) -> u32 {
        self.iter().map(|r| r.duration_minutes()).sum()
    }
}
