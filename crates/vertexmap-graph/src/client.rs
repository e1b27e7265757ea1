//! Transport seam and the shared graph client.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use vertexmap_core::{MapperConfig, MapperError};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Transport error for statement `{statement}`: {source}")]
    Transport {
        statement: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error(transparent)]
    Mapper(#[from] MapperError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ── Wire shapes ──────────────────────────────────────────────────

/// One record as returned by the server: key/value pairs in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, Value)>,
}

impl RawRecord {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    /// Build from a JSON object, keeping its key order.
    pub fn from_json(value: Value) -> Result<Self, GraphError> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(GraphError::MalformedRecord(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.fields.push((key.into(), value));
    }
}

impl FromIterator<(String, Value)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Everything the transport hands back for one submitted statement.
///
/// `status_attributes` carries provider response metadata (status codes,
/// request charge, retry hints) untouched.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub records: Vec<RawRecord>,
    pub status_attributes: Map<String, Value>,
}

impl ResultSet {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            status_attributes: Map::new(),
        }
    }

    pub fn with_status_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.status_attributes = attributes;
        self
    }

    pub fn status_attribute(&self, key: &str) -> Option<&Value> {
        self.status_attributes.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Transport ────────────────────────────────────────────────────

/// The network boundary: submit a statement, get back raw records.
///
/// Retries, backoff and timeouts belong to implementations of this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, statement: &str) -> anyhow::Result<ResultSet>;
}

/// Shared graph client over a [`Transport`].
///
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    transport: Arc<dyn Transport>,
    config: MapperConfig,
}

impl GraphClient {
    pub fn new(transport: Arc<dyn Transport>, config: MapperConfig) -> Self {
        Self { transport, config }
    }

    /// A client with [`MapperConfig::default`].
    pub fn with_defaults(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, MapperConfig::default())
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Submit one statement as-is.
    pub async fn submit(&self, statement: &str) -> Result<ResultSet, GraphError> {
        if self.config.log_statements {
            tracing::debug!(statement, "Submitting statement");
        }

        let result = self
            .transport
            .submit(statement)
            .await
            .map_err(|source| GraphError::Transport {
                statement: statement.to_string(),
                source,
            })?;

        tracing::trace!(records = result.len(), "Statement completed");
        Ok(result)
    }
}
