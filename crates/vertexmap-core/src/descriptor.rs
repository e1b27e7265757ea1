//! Entity descriptors: the resolved, immutable form of a [`VertexSchema`].
//!
//! Descriptors are cached process-wide, keyed by Rust type. The cache is
//! built lazily on first use of each type and never mutated afterwards;
//! call [`register`] at startup to surface registration errors early.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::error::MapperError;
use crate::schema::{FieldType, VertexSchema};
use crate::vertex::Vertex;

/// Resolved metadata for one property binding.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Wire-key used in statements and query results.
    pub key: String,
    /// Field name passed to `Vertex::get` / `Vertex::set`.
    pub field: String,
    pub field_type: FieldType,
    pub multi_valued: bool,
    pub required: bool,
    pub include_in_graph: bool,
    pub description: Option<String>,
}

/// Resolved metadata for one vertex type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub type_name: &'static str,
    pub label: String,
    pub description: Option<String>,
    pub identifier_field: String,
    /// Wire-key the identifier is written under on create.
    pub identifier_key: String,
    properties: Vec<PropertyDescriptor>,
}

impl EntityDescriptor {
    /// Validate a schema and resolve its wire-keys.
    pub fn build(schema: VertexSchema) -> Result<Self, MapperError> {
        let entity = schema.type_name;

        let label = match schema.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => {
                return Err(MapperError::MissingLabelMetadata {
                    entity: entity.to_string(),
                })
            }
        };

        if schema.identifier_field.trim().is_empty() || schema.identifier_key.trim().is_empty() {
            return Err(MapperError::MissingIdentifierField {
                entity: entity.to_string(),
            });
        }

        let mut properties: Vec<PropertyDescriptor> = Vec::with_capacity(schema.properties.len());
        for binding in schema.properties {
            let key = binding
                .key
                .unwrap_or_else(|| schema.naming_policy.apply(&binding.field));

            if binding.include_in_graph && !binding.field_type.is_supported() {
                return Err(MapperError::UnsupportedFieldType {
                    entity: entity.to_string(),
                    field: binding.field,
                    type_name: binding.field_type.to_string(),
                });
            }

            if key == schema.identifier_key || properties.iter().any(|p| p.key == key) {
                return Err(MapperError::DuplicatePropertyKey {
                    entity: entity.to_string(),
                    key,
                });
            }

            properties.push(PropertyDescriptor {
                key,
                field: binding.field,
                multi_valued: binding.field_type.is_list(),
                field_type: binding.field_type,
                required: binding.required,
                include_in_graph: binding.include_in_graph,
                description: binding.description,
            });
        }

        tracing::debug!(
            entity,
            label = %label,
            properties = properties.len(),
            "Built entity descriptor"
        );

        Ok(Self {
            type_name: entity,
            label,
            description: schema.description,
            identifier_field: schema.identifier_field,
            identifier_key: schema.identifier_key,
            properties,
        })
    }

    /// All bindings in declaration order, excluded ones included.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Bindings written to the graph, in declaration order.
    pub fn graph_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.include_in_graph)
    }

    /// Look up a binding by wire-key.
    pub fn property(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.key == key)
    }

    /// Look up a binding by field name.
    pub fn property_for_field(&self, field: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.field == field)
    }

    /// Graph properties whose typed values differ between two instances.
    pub fn changed_properties<V: Vertex>(&self, current: &V, baseline: &V) -> Vec<&PropertyDescriptor> {
        self.graph_properties()
            .filter(|p| !same_field(current, baseline, &p.field))
            .collect()
    }

    /// Field-by-field comparison over the identifier and graph properties.
    pub fn differs<V: Vertex>(&self, current: &V, baseline: &V) -> bool {
        current.id() != baseline.id()
            || self
                .graph_properties()
                .any(|p| !same_field(current, baseline, &p.field))
    }
}

fn same_field<V: Vertex>(a: &V, b: &V, field: &str) -> bool {
    match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => x.same_as(&y),
        (None, None) => true,
        _ => false,
    }
}

// ── Registry ──────────────────────────────────────────────────────

type Registry = RwLock<HashMap<TypeId, Arc<EntityDescriptor>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The cached descriptor for `V`, building it on first use.
///
/// Racing first calls may each build a descriptor; the first one inserted
/// is kept and returned to everyone. Failed builds are not cached.
pub fn descriptor_of<V: Vertex>() -> Result<Arc<EntityDescriptor>, MapperError> {
    let type_id = TypeId::of::<V>();
    {
        let guard = registry().read().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = guard.get(&type_id) {
            return Ok(Arc::clone(found));
        }
    }

    let built = Arc::new(EntityDescriptor::build(V::schema())?);
    let mut guard = registry().write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(guard.entry(type_id).or_insert(built)))
}

/// Eagerly build and cache the descriptor for `V`.
pub fn register<V: Vertex>() -> Result<Arc<EntityDescriptor>, MapperError> {
    descriptor_of::<V>()
}
