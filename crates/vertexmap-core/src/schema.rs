//! Static schema declarations for vertex types.
//!
//! Every vertex type describes itself once through a [`VertexSchema`]:
//!
//! ```
//! # use vertexmap_core::schema::{FieldType, PropertyBinding, VertexSchema};
//! let schema = VertexSchema::new("Room")
//!     .label("room")
//!     .description("A room where a session is presented")
//!     .field("sessionize_id", FieldType::String)
//!     .property("name", "name", FieldType::String)
//!     .field("sort_order", FieldType::Int)
//!     .bind(PropertyBinding::new("notes", FieldType::String).exclude_from_graph());
//! assert_eq!(schema.type_name(), "Room");
//! ```
//!
//! The declaration is resolved into an immutable
//! [`EntityDescriptor`](crate::descriptor::EntityDescriptor) on first use.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Field types ───────────────────────────────────────────────────

/// Declared storage type of a vertex field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    Byte,
    /// UTC timestamp, RFC 3339 on the wire.
    DateTime,
    String,
    /// Ordered multi-valued property; one wire entry per element.
    List(Box<FieldType>),
    /// A field whose Rust type has no graph representation (the name is
    /// kept for diagnostics). Rejected at registration unless excluded.
    Unsupported(&'static str),
}

impl FieldType {
    pub fn list(element: FieldType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The element type for lists, `self` for scalars.
    pub fn element(&self) -> &FieldType {
        match self {
            Self::List(inner) => inner,
            other => other,
        }
    }

    /// Scalars and flat lists of scalars are storable; nested lists are not.
    pub fn is_supported(&self) -> bool {
        match self {
            Self::Unsupported(_) => false,
            Self::List(inner) => !inner.is_list() && inner.is_supported(),
            _ => true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Byte => f.write_str("byte"),
            Self::DateTime => f.write_str("datetime"),
            Self::String => f.write_str("string"),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}

// ── Naming ────────────────────────────────────────────────────────

/// How wire-keys are derived from snake_case field names when a binding
/// does not name its key explicitly.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PropertyNamingPolicy {
    /// Use the field name unchanged.
    SourceCase,
    /// `sort_order` → `sortOrder`
    #[default]
    CamelCase,
    /// `sort_order` → `SortOrder`
    PascalCase,
}

impl PropertyNamingPolicy {
    pub fn apply(self, field: &str) -> String {
        match self {
            Self::SourceCase => field.to_string(),
            Self::CamelCase => {
                let pascal = to_pascal(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            Self::PascalCase => to_pascal(field),
        }
    }
}

fn to_pascal(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

// ── Bindings ──────────────────────────────────────────────────────

/// One field ↔ wire-key binding.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub(crate) field: String,
    pub(crate) key: Option<String>,
    pub(crate) field_type: FieldType,
    pub(crate) required: bool,
    pub(crate) include_in_graph: bool,
    pub(crate) description: Option<String>,
}

impl PropertyBinding {
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            key: None,
            field_type,
            required: false,
            include_in_graph: true,
            description: None,
        }
    }

    /// Override the wire-key instead of deriving it from the naming policy.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Keep the field in the descriptor but never write it to the graph.
    pub fn exclude_from_graph(mut self) -> Self {
        self.include_in_graph = false;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ── Vertex schema ─────────────────────────────────────────────────

/// Statically declared description of one vertex type.
#[derive(Debug, Clone)]
pub struct VertexSchema {
    pub(crate) type_name: &'static str,
    pub(crate) label: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) identifier_field: String,
    pub(crate) identifier_key: String,
    pub(crate) naming_policy: PropertyNamingPolicy,
    pub(crate) properties: Vec<PropertyBinding>,
}

impl VertexSchema {
    /// Start a schema for the Rust type called `type_name`. The identifier
    /// defaults to field `id` stored under wire-key `id`.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            label: None,
            description: None,
            identifier_field: "id".to_string(),
            identifier_key: "id".to_string(),
            naming_policy: PropertyNamingPolicy::default(),
            properties: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn identifier(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.identifier_field = field.into();
        self.identifier_key = key.into();
        self
    }

    /// Applies to bindings without an explicit key, including ones added
    /// before this call.
    pub fn naming_policy(mut self, policy: PropertyNamingPolicy) -> Self {
        self.naming_policy = policy;
        self
    }

    /// Bind `field` to an explicit wire-key.
    pub fn property(
        self,
        key: impl Into<String>,
        field: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        self.bind(PropertyBinding::new(field, field_type).key(key))
    }

    /// Bind `field` under a key derived from the naming policy.
    pub fn field(self, field: impl Into<String>, field_type: FieldType) -> Self {
        self.bind(PropertyBinding::new(field, field_type))
    }

    pub fn bind(mut self, binding: PropertyBinding) -> Self {
        self.properties.push(binding);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_policies() {
        assert_eq!(PropertyNamingPolicy::CamelCase.apply("sort_order"), "sortOrder");
        assert_eq!(PropertyNamingPolicy::CamelCase.apply("name"), "name");
        assert_eq!(PropertyNamingPolicy::PascalCase.apply("sort_order"), "SortOrder");
        assert_eq!(PropertyNamingPolicy::SourceCase.apply("sort_order"), "sort_order");
        assert_eq!(
            PropertyNamingPolicy::CamelCase.apply("sessionize_id"),
            "sessionizeId"
        );
    }

    #[test]
    fn field_type_support() {
        assert!(FieldType::String.is_supported());
        assert!(FieldType::list(FieldType::Int).is_supported());
        assert!(!FieldType::list(FieldType::list(FieldType::Int)).is_supported());
        assert!(!FieldType::Unsupported("HashMap<String, String>").is_supported());
        assert!(!FieldType::list(FieldType::Unsupported("Uuid")).is_supported());
    }

    #[test]
    fn field_type_display() {
        assert_eq!(FieldType::list(FieldType::DateTime).to_string(), "list<datetime>");
        assert_eq!(FieldType::Unsupported("Uuid").to_string(), "Uuid");
    }
}
