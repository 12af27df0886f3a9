//! Hunt journal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hunt::HuntId;

/// Identifier assigned to a log entry by the record store.
pub type LogId = u64;

/// A journal entry recording progress on a hunt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuntLog {
    pub id: LogId,

    /// Owning hunt
    pub hunt_id: HuntId,

    /// Week of the hunt this entry covers
    #[serde(default)]
    pub week_number: Option<i32>,

    /// Entry body
    #[serde(default)]
    pub entry: Option<String>,

    #[serde(default)]
    pub breakthroughs: Vec<String>,

    #[serde(default)]
    pub failed_approaches: Vec<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl HuntLog {
    pub fn from_draft(id: LogId, hunt_id: HuntId, draft: NewLog, now: DateTime<Utc>) -> Self {
        Self {
            id,
            hunt_id,
            week_number: draft.week_number,
            entry: draft.entry,
            breakthroughs: draft.breakthroughs,
            failed_approaches: draft.failed_approaches,
            created_at: now,
        }
    }

    /// Apply a partial update. Absent fields keep their current value.
    pub fn apply(&mut self, patch: LogPatch) {
        if let Some(week_number) = patch.week_number {
            self.week_number = Some(week_number);
        }
        if let Some(entry) = patch.entry {
            self.entry = Some(entry);
        }
        if let Some(breakthroughs) = patch.breakthroughs {
            self.breakthroughs = breakthroughs;
        }
        if let Some(failed_approaches) = patch.failed_approaches {
            self.failed_approaches = failed_approaches;
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Request to create a log entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLog {
    #[serde(default)]
    pub week_number: Option<i32>,
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub breakthroughs: Vec<String>,
    #[serde(default)]
    pub failed_approaches: Vec<String>,
}

/// Partial update of a log entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPatch {
    #[serde(default)]
    pub week_number: Option<i32>,
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub breakthroughs: Option<Vec<String>>,
    #[serde(default)]
    pub failed_approaches: Option<Vec<String>>,
}
