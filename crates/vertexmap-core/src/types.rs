//! Core types shared by the change tracker, the result decoder and the
//! statement synthesizer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identifiers ───────────────────────────────────────────────────

/// Generate a fresh vertex identifier (random UUID v4, hyphenated).
pub fn new_identifier() -> String {
    Uuid::new_v4().to_string()
}

// ── Lifecycle ─────────────────────────────────────────────────────

/// Lifecycle state of a vertex relative to a change tracker.
///
/// `Detached` is never stored; it is what the tracker reports for an
/// identifier it holds no entry for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum VertexState {
    #[default]
    Detached,
    Added,
    Unchanged,
    Modified,
    Deleted,
}

impl VertexState {
    /// Whether an entry in this state needs a statement at save time.
    pub fn is_dirty(self) -> bool {
        matches!(self, Self::Added | Self::Modified | Self::Deleted)
    }
}

impl fmt::Display for VertexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Detached => "detached",
            Self::Added => "added",
            Self::Unchanged => "unchanged",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

// ── Wire records ──────────────────────────────────────────────────

/// The kind of graph object a wire record describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Undefined,
    Vertex,
    Edge,
}

impl RecordKind {
    /// Map the wire `type` field. Case-insensitive; blank or unknown
    /// values map to `Undefined`.
    pub fn from_wire(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("vertex") {
            Self::Vertex
        } else if trimmed.eq_ignore_ascii_case("edge") {
            Self::Edge
        } else {
            Self::Undefined
        }
    }
}

/// A decoded wire record: identity plus raw property values per wire-key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub label: String,
    pub id: String,
    pub kind: RecordKind,
    /// Wire-key → values in the order they appeared on the wire.
    pub properties: BTreeMap<String, Vec<String>>,
}

impl NormalizedRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
            kind,
            properties: BTreeMap::new(),
        }
    }

    pub fn is_vertex(&self) -> bool {
        self.kind == RecordKind::Vertex
    }

    /// Append one value under `key`, keeping earlier occurrences.
    pub fn push_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// All values recorded for `key` (empty if the key is absent).
    pub fn values(&self, key: &str) -> &[String] {
        self.properties.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
