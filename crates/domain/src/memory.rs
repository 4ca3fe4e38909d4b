//! Episodic memory entries held by NPC agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One thing an NPC remembers happening.
///
/// Entries are immutable once created and appended in chronological order;
/// recent entries are serialized into reasoning prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub event: String,
    pub location: String,
    pub emotion: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl MemoryEntry {
    pub fn new(
        event: impl Into<String>,
        location: impl Into<String>,
        emotion: impl Into<String>,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event: event.into(),
            location: location.into(),
            emotion: emotion.into(),
            timestamp,
            description: description.into(),
        }
    }
}
