//! The trait every tracked entity type implements.

use std::sync::Arc;

use crate::codec::PropertyValue;
use crate::descriptor::{self, EntityDescriptor};
use crate::error::MapperError;
use crate::schema::VertexSchema;

/// An application record mapped to a graph vertex.
///
/// Implementations expose their fields by name so the mapper can read and
/// write them without reflection. Field names are the ones declared in
/// [`Vertex::schema`].
pub trait Vertex: Clone + Default + Send + Sync + 'static {
    /// Static declaration of label, identifier and property bindings.
    fn schema() -> VertexSchema;

    /// The vertex identifier; empty until assigned.
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Current value of a declared field, `None` for unknown names.
    fn get(&self, field: &str) -> Option<PropertyValue>;

    /// Overwrite a declared field with a decoded value.
    fn set(&mut self, field: &str, value: PropertyValue) -> Result<(), MapperError>;

    /// The cached descriptor for this type, built on first use.
    fn descriptor() -> Result<Arc<EntityDescriptor>, MapperError> {
        descriptor::descriptor_of::<Self>()
    }
}
