// file: src/models/record.rs
// description: fixture record model and snapshot serialization helpers
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// One entry per regular file found in the fixture folder. `id` is the file's
/// relative name, unique within a snapshot by filesystem uniqueness.
///
/// Exactly one of `content` (raw text) or `data` (decoded structured value)
/// is set; the absent field is omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl FixtureRecord {
    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Some(content.into()),
            data: None,
        }
    }

    pub fn structured(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            content: None,
            data: Some(data),
        }
    }
}

/// The snapshot wire format is a bare JSON array of records.
pub fn snapshot_to_json(records: &[FixtureRecord]) -> crate::error::Result<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

pub fn snapshot_from_json(bytes: &[u8]) -> crate::error::Result<Vec<FixtureRecord>> {
    Ok(serde_json::from_slice(bytes)?)
}
