//! vertexmap-graph: change tracking, statement synthesis, and result
//! decoding over a pluggable graph transport.
//!
//! A [`GraphSet`] tracks the vertices of one type as a unit of work.
//! [`GraphClient::save_changes`] turns its pending changes into statements
//! and submits them; [`GraphClient::query`] decodes query results back into
//! tracked vertices.

pub mod client;
pub mod decoder;
pub mod mutations;
pub mod queries;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use client::{GraphClient, GraphError, RawRecord, ResultSet, Transport};
pub use mutations::{ChangeSet, PendingStatement};
pub use tracker::{GraphSet, TrackedVertex};
