//! Write path: pending changes → statements → transport.
//!
//! Statement grammar:
//! - `create('<label>').property('<id key>','<id>')[.property('<key>',<literal>)]*`
//! - `select('<id>')[.property('<key>',<literal>)]*`
//! - `select('<id>').drop()`

use serde::Serialize;

use vertexmap_core::codec::quote;
use vertexmap_core::{EntityDescriptor, Vertex, VertexState};

use crate::client::{GraphClient, GraphError};
use crate::tracker::{encoded, GraphSet, TrackedVertex};

/// A statement waiting to be submitted for one tracked entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingStatement {
    pub id: String,
    pub state: VertexState,
    pub statement: String,
}

/// Something whose pending changes can be saved and then committed.
///
/// Lets [`GraphClient::save_all`] drive sets of different vertex types.
pub trait ChangeSet: Send {
    fn label(&self) -> &str;

    /// Statements for every dirty entry, in tracker order.
    fn pending(&self) -> Vec<PendingStatement>;

    /// Mark one entry as persisted.
    fn accept(&mut self, id: &str);

    /// Mark everything as persisted.
    fn accept_all(&mut self);
}

impl<V: Vertex> ChangeSet for GraphSet<V> {
    fn label(&self) -> &str {
        GraphSet::label(self)
    }

    fn pending(&self) -> Vec<PendingStatement> {
        synthesize(self)
    }

    fn accept(&mut self, id: &str) {
        GraphSet::accept(self, id);
    }

    fn accept_all(&mut self) {
        self.accept_changes();
    }
}

// ── Synthesis ────────────────────────────────────────────────────

/// Statements for all dirty entries of `set`, in insertion order.
pub fn synthesize<V: Vertex>(set: &GraphSet<V>) -> Vec<PendingStatement> {
    let descriptor = set.descriptor();
    set.entries()
        .filter_map(|entry| {
            statement_for(descriptor, entry).map(|statement| PendingStatement {
                id: entry.id().to_string(),
                state: entry.state(),
                statement,
            })
        })
        .collect()
}

/// The statement for one entry, `None` when there is nothing to write.
pub fn statement_for<V: Vertex>(
    descriptor: &EntityDescriptor,
    entry: &TrackedVertex<V>,
) -> Option<String> {
    match entry.state() {
        VertexState::Added => Some(create_statement(descriptor, entry.id(), entry.current())),
        VertexState::Modified => update_statement(descriptor, entry),
        VertexState::Deleted if entry.id().trim().is_empty() => None,
        VertexState::Deleted => Some(drop_statement(entry.id())),
        VertexState::Unchanged | VertexState::Detached => None,
    }
}

/// `(key, literal)` pairs for every graph property of `vertex` with a
/// writable value. Multi-valued properties yield one pair per element.
pub fn property_clauses<V: Vertex>(
    descriptor: &EntityDescriptor,
    vertex: &V,
) -> Vec<(String, String)> {
    descriptor
        .graph_properties()
        .flat_map(|property| {
            encoded(vertex, property)
                .into_iter()
                .map(move |literal| (property.key.clone(), literal))
        })
        .collect()
}

fn create_statement<V: Vertex>(descriptor: &EntityDescriptor, id: &str, vertex: &V) -> String {
    let mut statement = format!("create({})", quote(&descriptor.label));
    push_clause(&mut statement, &descriptor.identifier_key, &quote(id));

    for property in descriptor.graph_properties().filter(|p| p.required) {
        if encoded(vertex, property).is_empty() {
            tracing::warn!(
                label = %descriptor.label,
                id,
                key = %property.key,
                "Required property has no value"
            );
        }
    }

    for (key, literal) in property_clauses(descriptor, vertex) {
        push_clause(&mut statement, &key, &literal);
    }
    statement
}

fn update_statement<V: Vertex>(
    descriptor: &EntityDescriptor,
    entry: &TrackedVertex<V>,
) -> Option<String> {
    let mut statement = format!("select({})", quote(entry.id()));
    let mut changed = false;

    for property in descriptor.graph_properties() {
        let current = encoded(entry.current(), property);
        let baseline = entry
            .baseline()
            .map(|b| encoded(b, property))
            .unwrap_or_default();
        if current == baseline {
            continue;
        }
        if current.is_empty() {
            tracing::warn!(
                label = %descriptor.label,
                id = entry.id(),
                key = %property.key,
                "Cleared property cannot be written; leaving the stored value"
            );
            continue;
        }
        for literal in &current {
            push_clause(&mut statement, &property.key, literal);
        }
        changed = true;
    }

    changed.then_some(statement)
}

/// `select('<id>').drop()`
pub fn drop_statement(id: &str) -> String {
    format!("select({}).drop()", quote(id))
}

fn push_clause(statement: &mut String, key: &str, literal: &str) {
    statement.push_str(".property(");
    statement.push_str(&quote(key));
    statement.push(',');
    statement.push_str(literal);
    statement.push(')');
}

// ── Saving ───────────────────────────────────────────────────────

impl GraphClient {
    /// Submit the pending statements of one set.
    pub async fn save_changes<V: Vertex>(&self, set: &mut GraphSet<V>) -> Result<usize, GraphError> {
        self.save_all(&mut [set as &mut dyn ChangeSet]).await
    }

    /// Submit pending statements set by set, in order.
    ///
    /// Each entry is accepted as soon as its statement succeeds, so a
    /// failure leaves only the unsent entries dirty. Returns the number of
    /// statements submitted.
    pub async fn save_all(&self, sets: &mut [&mut dyn ChangeSet]) -> Result<usize, GraphError> {
        let mut total = 0;

        for set in sets.iter_mut() {
            let pending = set.pending();
            for item in &pending {
                self.submit(&item.statement).await?;
                set.accept(&item.id);
            }
            // Commit entries whose only changes had no statement form.
            set.accept_all();

            if !pending.is_empty() {
                tracing::info!(
                    label = set.label(),
                    statements = pending.len(),
                    "Saved changes"
                );
            }
            total += pending.len();
        }

        Ok(total)
    }
}
