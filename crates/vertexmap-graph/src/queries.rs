//! Read path: submit a query, decode the records, materialize vertices.

use vertexmap_core::{NormalizedRecord, Vertex};

use crate::client::{GraphClient, GraphError};
use crate::decoder;
use crate::tracker::GraphSet;

impl GraphClient {
    /// Submit a query and decode every returned record.
    pub async fn query_records(&self, statement: &str) -> Result<Vec<NormalizedRecord>, GraphError> {
        let result = self.submit(statement).await?;
        decoder::decode_records(&result.records)
    }

    /// Submit a query and materialize the vertices of `set`'s label into it.
    ///
    /// Records of other labels and non-vertex records are skipped.
    pub async fn query<V: Vertex>(
        &self,
        statement: &str,
        set: &mut GraphSet<V>,
    ) -> Result<Vec<V>, GraphError> {
        let records = self.query_records(statement).await?;
        let policy = self.config().decode_policy;

        let mut vertices = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(vertex) = set.materialize(record, policy)? {
                vertices.push(vertex);
            }
        }

        tracing::debug!(
            label = set.label(),
            records = records.len(),
            materialized = vertices.len(),
            "Query complete"
        );
        Ok(vertices)
    }
}
