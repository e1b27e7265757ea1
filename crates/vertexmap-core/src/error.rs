use thiserror::Error;

use crate::codec::DecodeError;

/// Top-level error type for the vertexmap mapper.
#[derive(Error, Debug)]
pub enum MapperError {
    // ── Registration ──────────────────────────────────────────────
    #[error("Vertex type {entity} declares no label metadata")]
    MissingLabelMetadata { entity: String },

    #[error("Vertex type {entity} declares no identifier field")]
    MissingIdentifierField { entity: String },

    #[error("Field {entity}.{field} has type {type_name}, which cannot be stored in the graph")]
    UnsupportedFieldType {
        entity: String,
        field: String,
        type_name: String,
    },

    #[error("Vertex type {entity} binds property key '{key}' more than once")]
    DuplicatePropertyKey { entity: String, key: String },

    // ── Change tracker ────────────────────────────────────────────
    #[error("Vertex {id} is already tracked for label '{label}'")]
    DuplicateTrackedEntity { label: String, id: String },

    #[error("Vertex of type {entity} has no identifier")]
    MissingIdentifier { entity: String },

    #[error("Vertex {id} is not in the change tracker for label '{label}'")]
    NotTracked { label: String, id: String },

    #[error("Vertex {id} is marked for deletion and cannot be updated")]
    VertexDeleted { id: String },

    // ── Values ────────────────────────────────────────────────────
    #[error("Failed to decode {entity}.{field}: {source}")]
    Decode {
        entity: String,
        field: String,
        #[source]
        source: DecodeError,
    },

    #[error("Field {entity}.{field} expects {expected}, got {found}")]
    FieldTypeMismatch {
        entity: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Vertex type {entity} has no field named {field}")]
    UnknownField { entity: String, field: String },

    // ── Ambient ───────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MapperError {
    /// Shorthand used by `Vertex::set` implementations for unknown field names.
    pub fn unknown_field(entity: &str, field: &str) -> Self {
        Self::UnknownField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
