//! Call-log records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::RecordKey;

/// How a call was placed or received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// Answered inbound call.
    Incoming,
    /// Outbound call.
    Outgoing,
    /// Inbound call that was not answered.
    Missed,
    /// Inbound call declined by the user.
    Rejected,
    /// Inbound call dropped by a block list.
    Blocked,
    /// Call that went to voicemail.
    Voicemail,
    /// Anything the source did not classify.
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
            Self::Missed => "missed",
            Self::Rejected => "rejected",
            Self::Blocked => "blocked",
            Self::Voicemail => "voicemail",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One entry of the call log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Unique identifier assigned by the call-log source.
    pub id: String,
    /// Remote party's number as recorded by the device.
    pub number: String,
    /// Cached contact name, if the number matched a contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Direction / disposition of the call.
    #[serde(default)]
    pub kind: CallKind,
    /// Unix timestamp in milliseconds when the call started.
    #[serde(default)]
    pub timestamp: i64,
    /// Call length in seconds (0 for missed calls).
    #[serde(default)]
    pub duration_secs: u64,
}

impl CallRecord {
    /// Create a record with the given id and number; other fields default.
    pub fn new(id: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            name: None,
            kind: CallKind::Unknown,
            timestamp: 0,
            duration_secs: 0,
        }
    }

    /// Set the contact name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set the call kind.
    pub fn with_kind(mut self, kind: CallKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the start timestamp (Unix millis) and duration.
    pub fn at(mut self, timestamp: i64, duration_secs: u64) -> Self {
        self.timestamp = timestamp;
        self.duration_secs = duration_secs;
        self
    }

    /// The key identifying this record across snapshots.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.id.as_str())
    }
}
