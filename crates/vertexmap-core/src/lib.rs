//! vertexmap-core: entity metadata, value conversion, and shared types for
//! the vertexmap object-graph mapper.
//!
//! This crate provides the pieces that do not touch the wire:
//! - Static vertex schemas and the cached entity descriptors built from them
//! - The value codec between wire text, typed values, and statement literals
//! - Lifecycle states and the normalized record shape
//! - Configuration management
//! - Common error types

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod schema;
pub mod types;
pub mod vertex;

pub use codec::{DecodeError, PropertyValue};
pub use config::{DecodePolicy, MapperConfig};
pub use descriptor::{EntityDescriptor, PropertyDescriptor};
pub use error::MapperError;
pub use schema::{FieldType, PropertyBinding, PropertyNamingPolicy, VertexSchema};
pub use types::{NormalizedRecord, RecordKind, VertexState};
pub use vertex::Vertex;
