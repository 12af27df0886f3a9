//! Hunt records.
//!
//! A hunt is the container every log and node belongs to. Deleting a hunt
//! removes its logs and nodes with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a hunt by the record store.
pub type HuntId = u64;

/// Status given to hunts created without one.
pub const DEFAULT_HUNT_STATUS: &str = "active";

fn default_status() -> String {
    DEFAULT_HUNT_STATUS.to_string()
}

/// A research/investigation project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunt {
    /// Store-assigned identifier
    pub id: HuntId,

    /// Display name
    pub name: String,

    /// Where the hunt takes place
    #[serde(default)]
    pub terrain: Option<String>,

    /// What counts as success
    #[serde(default)]
    pub victory_conditions: Option<String>,

    /// Known ways the hunt can fail
    #[serde(default)]
    pub failure_modes: Option<String>,

    /// Free-form expected duration (e.g. "6 weeks")
    #[serde(default)]
    pub duration: Option<String>,

    /// Lifecycle status ("active" unless set otherwise)
    #[serde(default = "default_status")]
    pub status: String,

    /// When the hunt started
    pub start_date: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Hunt {
    /// Build a hunt record from a creation request.
    pub fn from_draft(id: HuntId, draft: NewHunt, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            terrain: draft.terrain,
            victory_conditions: draft.victory_conditions,
            failure_modes: draft.failure_modes,
            duration: draft.duration,
            status: draft.status.unwrap_or_else(default_status),
            start_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Absent fields keep their current value.
    pub fn apply(&mut self, patch: HuntPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(terrain) = patch.terrain {
            self.terrain = Some(terrain);
        }
        if let Some(victory_conditions) = patch.victory_conditions {
            self.victory_conditions = Some(victory_conditions);
        }
        if let Some(failure_modes) = patch.failure_modes {
            self.failure_modes = Some(failure_modes);
        }
        if let Some(duration) = patch.duration {
            self.duration = Some(duration);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }

    /// Serialize to JSON bytes for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Request to create a hunt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHunt {
    pub name: String,
    #[serde(default)]
    pub terrain: Option<String>,
    #[serde(default)]
    pub victory_conditions: Option<String>,
    #[serde(default)]
    pub failure_modes: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl NewHunt {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Partial update of a hunt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuntPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub terrain: Option<String>,
    #[serde(default)]
    pub victory_conditions: Option<String>,
    #[serde(default)]
    pub failure_modes: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
