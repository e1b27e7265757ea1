//! Change tracking: one unit-of-work table per vertex type.
//!
//! Entries are kept in insertion order with an id → slot index on the side,
//! so statement synthesis replays changes in the order they were made.

use std::collections::HashMap;
use std::sync::Arc;

use vertexmap_core::codec::{self, DecodeError};
use vertexmap_core::types::new_identifier;
use vertexmap_core::{
    DecodePolicy, EntityDescriptor, MapperError, NormalizedRecord, PropertyDescriptor,
    PropertyValue, Vertex, VertexState,
};

/// One tracked vertex: its current value, the last committed value and
/// its lifecycle state.
#[derive(Debug, Clone)]
pub struct TrackedVertex<V> {
    id: String,
    current: V,
    baseline: Option<V>,
    state: VertexState,
}

impl<V> TrackedVertex<V> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn current(&self) -> &V {
        &self.current
    }

    /// The value as last loaded or saved; `None` for entries never
    /// committed.
    pub fn baseline(&self) -> Option<&V> {
        self.baseline.as_ref()
    }

    pub fn state(&self) -> VertexState {
        self.state
    }
}

/// Tracked vertices of one type.
#[derive(Debug)]
pub struct GraphSet<V: Vertex> {
    descriptor: Arc<EntityDescriptor>,
    entries: Vec<TrackedVertex<V>>,
    index: HashMap<String, usize>,
}

impl<V: Vertex> GraphSet<V> {
    /// An empty set. Fails if `V`'s schema does not register.
    pub fn new() -> Result<Self, MapperError> {
        Ok(Self {
            descriptor: V::descriptor()?,
            entries: Vec::new(),
            index: HashMap::new(),
        })
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    pub fn label(&self) -> &str {
        &self.descriptor.label
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &TrackedVertex<V>> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&TrackedVertex<V>> {
        self.index.get(id).map(|&slot| &self.entries[slot])
    }

    /// Whether any entry would produce a statement.
    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(|e| e.state.is_dirty())
    }

    pub fn state_of(&self, vertex: &V) -> VertexState {
        self.state_of_id(vertex.id())
    }

    /// `Detached` when nothing is tracked under `id`.
    pub fn state_of_id(&self, id: &str) -> VertexState {
        self.get(id).map_or(VertexState::Detached, |e| e.state)
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Start tracking a new vertex.
    ///
    /// An empty id is replaced by a fresh UUID, written back into `vertex`.
    pub fn add(&mut self, vertex: &mut V) -> Result<(), MapperError> {
        if vertex.id().trim().is_empty() {
            vertex.set_id(new_identifier());
        }

        let id = vertex.id().to_string();
        if self.index.contains_key(&id) {
            return Err(MapperError::DuplicateTrackedEntity {
                label: self.descriptor.label.clone(),
                id,
            });
        }

        tracing::debug!(label = %self.descriptor.label, id = %id, "Tracking new vertex");
        self.insert(TrackedVertex {
            id,
            current: vertex.clone(),
            baseline: None,
            state: VertexState::Added,
        });
        Ok(())
    }

    /// Record a new value for a tracked vertex and return its state.
    ///
    /// Updating to a value equal to the baseline returns the entry to
    /// `Unchanged`. Untracked vertices are rejected with `NotTracked`.
    pub fn update(&mut self, vertex: &V) -> Result<VertexState, MapperError> {
        let id = vertex.id();
        if id.trim().is_empty() {
            return Err(MapperError::MissingIdentifier {
                entity: self.descriptor.type_name.to_string(),
            });
        }

        let Some(&slot) = self.index.get(id) else {
            return Err(MapperError::NotTracked {
                label: self.descriptor.label.clone(),
                id: id.to_string(),
            });
        };

        let descriptor = &self.descriptor;
        let entry = &mut self.entries[slot];
        let next = match entry.state {
            VertexState::Deleted => {
                return Err(MapperError::VertexDeleted { id: id.to_string() });
            }
            VertexState::Added => VertexState::Added,
            _ => match &entry.baseline {
                Some(baseline) if !descriptor.differs(vertex, baseline) => VertexState::Unchanged,
                _ => VertexState::Modified,
            },
        };

        entry.current = vertex.clone();
        entry.state = next;
        tracing::debug!(label = %descriptor.label, id = %id, state = %next, "Updated vertex");
        Ok(next)
    }

    /// Mark a vertex for deletion and return its new state.
    ///
    /// A vertex without an id has nothing to delete remotely and is
    /// ignored (`Detached`). Untracked vertices are tracked as `Deleted`.
    pub fn delete(&mut self, vertex: &V) -> VertexState {
        let id = vertex.id();
        if id.trim().is_empty() {
            tracing::debug!(label = %self.descriptor.label, "Ignoring delete of vertex without id");
            return VertexState::Detached;
        }

        match self.index.get(id) {
            Some(&slot) => self.entries[slot].state = VertexState::Deleted,
            None => self.insert(TrackedVertex {
                id: id.to_string(),
                current: vertex.clone(),
                baseline: None,
                state: VertexState::Deleted,
            }),
        }

        tracing::debug!(label = %self.descriptor.label, id = %id, "Marked vertex deleted");
        VertexState::Deleted
    }

    /// Build a vertex from a decoded query record and track it as
    /// `Unchanged`.
    ///
    /// Returns `Ok(None)` for records that are not vertices of this label.
    /// Wire-keys with no binding are ignored. A value that fails to decode
    /// aborts the record under [`DecodePolicy::Strict`]; under
    /// [`DecodePolicy::Skip`] the field keeps its default.
    pub fn materialize(
        &mut self,
        record: &NormalizedRecord,
        policy: DecodePolicy,
    ) -> Result<Option<V>, MapperError> {
        if !record.is_vertex() || record.label != self.descriptor.label {
            tracing::trace!(
                id = %record.id,
                label = %record.label,
                kind = ?record.kind,
                "Record does not map to this vertex type"
            );
            return Ok(None);
        }

        if record.id.trim().is_empty() {
            return Err(MapperError::MissingIdentifier {
                entity: self.descriptor.type_name.to_string(),
            });
        }

        let mut vertex = V::default();
        vertex.set_id(record.id.clone());

        for (key, values) in &record.properties {
            let Some(property) = self.descriptor.property(key) else {
                tracing::trace!(key = %key, "Ignoring unmapped property");
                continue;
            };

            match decode_property(property, values) {
                Ok(Some(value)) => vertex.set(&property.field, value)?,
                Ok(None) => {}
                Err(source) if policy == DecodePolicy::Skip => {
                    tracing::warn!(
                        entity = self.descriptor.type_name,
                        id = %record.id,
                        field = %property.field,
                        error = %source,
                        "Skipping undecodable property"
                    );
                }
                Err(source) => {
                    return Err(MapperError::Decode {
                        entity: self.descriptor.type_name.to_string(),
                        field: property.field.clone(),
                        source,
                    });
                }
            }
        }

        tracing::debug!(label = %self.descriptor.label, id = %record.id, "Materialized vertex");
        self.upsert(TrackedVertex {
            id: record.id.clone(),
            current: vertex.clone(),
            baseline: Some(vertex.clone()),
            state: VertexState::Unchanged,
        });
        Ok(Some(vertex))
    }

    // ── Commit ───────────────────────────────────────────────────

    /// Mark one entry as persisted. `Deleted` entries are dropped.
    /// `Added`/`Modified` entries take the current value as baseline and
    /// become `Unchanged`, except for properties cleared to empty: those
    /// were never written, so the baseline keeps the stored value and the
    /// entry stays `Modified`.
    pub fn accept(&mut self, id: &str) {
        let Some(&slot) = self.index.get(id) else {
            return;
        };
        let state = self.entries[slot].state;
        match state {
            VertexState::Deleted => self.remove(slot),
            VertexState::Added | VertexState::Modified => {
                commit(&self.descriptor, &mut self.entries[slot]);
            }
            VertexState::Unchanged | VertexState::Detached => {}
        }
    }

    /// [`accept`](Self::accept) every entry.
    pub fn accept_changes(&mut self) {
        self.entries.retain(|e| e.state != VertexState::Deleted);
        for entry in &mut self.entries {
            commit(&self.descriptor, entry);
        }
        self.reindex(0);
    }

    // ── Internals ────────────────────────────────────────────────

    fn insert(&mut self, entry: TrackedVertex<V>) {
        self.index.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
    }

    fn upsert(&mut self, entry: TrackedVertex<V>) {
        match self.index.get(&entry.id) {
            Some(&slot) => self.entries[slot] = entry,
            None => self.insert(entry),
        }
    }

    fn remove(&mut self, slot: usize) {
        let removed = self.entries.remove(slot);
        self.index.remove(&removed.id);
        self.reindex(slot);
    }

    fn reindex(&mut self, from: usize) {
        if from == 0 {
            self.index.clear();
        }
        for (slot, entry) in self.entries.iter().enumerate().skip(from) {
            self.index.insert(entry.id.clone(), slot);
        }
    }
}

fn commit<V: Vertex>(descriptor: &EntityDescriptor, entry: &mut TrackedVertex<V>) {
    if !matches!(entry.state, VertexState::Added | VertexState::Modified) {
        return;
    }

    let mut baseline = entry.current.clone();
    if let Some(previous) = &entry.baseline {
        for property in descriptor.graph_properties() {
            if !is_cleared(property, &entry.current, previous) {
                continue;
            }
            let Some(stored) = previous.get(&property.field) else {
                continue;
            };
            if let Err(error) = baseline.set(&property.field, stored) {
                tracing::warn!(
                    id = %entry.id,
                    field = %property.field,
                    error = %error,
                    "Could not keep stored value in baseline"
                );
            }
        }
    }

    entry.state = if descriptor.differs(&entry.current, &baseline) {
        VertexState::Modified
    } else {
        VertexState::Unchanged
    };
    entry.baseline = Some(baseline);
}

/// Statement literals for one property of `vertex`; empty when nothing
/// can be written.
pub(crate) fn encoded<V: Vertex>(vertex: &V, property: &PropertyDescriptor) -> Vec<String> {
    vertex
        .get(&property.field)
        .map(|value| codec::encode_all(&value))
        .unwrap_or_default()
}

/// Whether `property` went from a stored value to one the statement
/// grammar cannot express.
pub(crate) fn is_cleared<V: Vertex>(property: &PropertyDescriptor, current: &V, baseline: &V) -> bool {
    encoded(current, property).is_empty() && !encoded(baseline, property).is_empty()
}

fn decode_property(
    property: &PropertyDescriptor,
    values: &[String],
) -> Result<Option<PropertyValue>, DecodeError> {
    if property.multi_valued {
        return codec::decode_list(values, &property.field_type).map(Some);
    }

    match values {
        [] => Ok(None),
        [single] => codec::decode(single, &property.field_type).map(Some),
        [first, ..] => {
            tracing::debug!(
                key = %property.key,
                count = values.len(),
                "Scalar property has several values; keeping the first"
            );
            codec::decode(first, &property.field_type).map(Some)
        }
    }
}
