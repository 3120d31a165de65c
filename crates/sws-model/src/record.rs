//! Window record type.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::kind::WindowKind;
use crate::payload::WindowPayload;
use crate::position::WindowPosition;

/// Window identifier, unique within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl WindowId {
    /// Largest id a record may carry. `u64::MAX` is left to the generator.
    pub const MAX: WindowId = WindowId(u64::MAX - 1);

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for WindowId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One visual panel: identity, placement, typed payload, tags and free text.
///
/// `content` is opaque to the persistence core; it is carried verbatim and
/// never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub kind: WindowKind,
    pub position: WindowPosition,
    #[serde(default)]
    pub payload: Option<WindowPayload>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl WindowRecord {
    /// Create a placeholder window (no payload) at the default position.
    pub fn new(id: WindowId, kind: WindowKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            position: WindowPosition::default(),
            payload: None,
            tags: BTreeSet::new(),
            content: String::new(),
            created_at: now,
            last_modified: now,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: WindowPosition) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attach a payload builder-style, rejecting mismatched or invalid bodies.
    pub fn with_payload(mut self, payload: WindowPayload) -> Result<Self> {
        self.set_payload(payload)?;
        Ok(self)
    }

    /// Replace the payload.
    ///
    /// The payload must belong to this window's kind and pass validation;
    /// otherwise the record is left untouched.
    pub fn set_payload(&mut self, payload: WindowPayload) -> Result<()> {
        payload.check_kind(self.kind)?;
        payload.validate()?;
        self.payload = Some(payload);
        self.touch();
        Ok(())
    }

    /// Drop the payload, turning the window into a placeholder.
    pub fn clear_payload(&mut self) -> Option<WindowPayload> {
        let previous = self.payload.take();
        if previous.is_some() {
            self.touch();
        }
        previous
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let inserted = self.tags.insert(tag.into());
        if inserted {
            self.touch();
        }
        inserted
    }

    /// Remove a tag. Returns `false` if it was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.tags.remove(tag);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    /// Move or resize the window. Placement changes do not count as edits.
    pub fn set_position(&mut self, position: WindowPosition) {
        self.position = position;
    }

    /// Check every record-level invariant.
    pub fn validate(&self) -> Result<()> {
        if self.id > WindowId::MAX {
            return Err(ModelError::IdOutOfRange(self.id));
        }
        if let Some(problem) = self.position.problem() {
            return Err(ModelError::InvalidPosition(format!("window {} {problem}", self.id)));
        }
        if let Some(payload) = &self.payload {
            payload.check_kind(self.kind)?;
            payload.validate()?;
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ChartSeries, TableFrame};

    #[test]
    fn test_tags_are_deduplicated() {
        let mut record = WindowRecord::new(WindowId(1), WindowKind::Chart);
        assert!(record.add_tag("demo"));
        assert!(!record.add_tag("demo"));
        assert_eq!(record.tags.len(), 1);
    }

    #[test]
    fn test_tag_mutation_updates_last_modified() {
        let mut record = WindowRecord::new(WindowId(1), WindowKind::Chart);
        let before = record.last_modified;
        std::thread::sleep(std::time::Duration::from_millis(2));
        record.add_tag("x");
        assert!(record.last_modified > before);
    }

    #[test]
    fn test_move_does_not_update_last_modified() {
        let mut record = WindowRecord::new(WindowId(1), WindowKind::Chart);
        let before = record.last_modified;
        std::thread::sleep(std::time::Duration::from_millis(2));
        record.set_position(WindowPosition::at(1.0, 2.0, 3.0));
        assert_eq!(record.last_modified, before);
    }

    #[test]
    fn test_set_payload_rejects_mismatch() {
        let mut record = WindowRecord::new(WindowId(7), WindowKind::TabularFrame);
        let err = record
            .set_payload(WindowPayload::Chart(ChartSeries::default()))
            .unwrap_err();
        assert!(matches!(err, ModelError::PayloadKindMismatch { .. }));
        assert!(record.payload.is_none());

        record
            .set_payload(WindowPayload::TabularFrame(TableFrame::default()))
            .unwrap();
        assert!(record.payload.is_some());
    }

    #[test]
    fn test_validate_catches_bad_position() {
        let record = WindowRecord::new(WindowId(1), WindowKind::Chart)
            .with_position(WindowPosition::at(f64::INFINITY, 0.0, 0.0));
        assert!(matches!(
            record.validate(),
            Err(ModelError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_validate_rejects_max_id() {
        let record = WindowRecord::new(WindowId(u64::MAX), WindowKind::Chart);
        assert_eq!(
            record.validate(),
            Err(ModelError::IdOutOfRange(WindowId(u64::MAX)))
        );
        assert!(WindowRecord::new(WindowId::MAX, WindowKind::Chart).validate().is_ok());
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = WindowRecord::new(WindowId(3), WindowKind::ScalarMetrics)
            .with_tag("b")
            .with_tag("a")
            .with_content("notes");
        let json = serde_json::to_string(&record).unwrap();
        let back: WindowRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
