//! Vertex fixtures for unit tests.

use chrono::{DateTime, Utc};

use vertexmap_core::{FieldType, MapperError, PropertyBinding, PropertyValue, Vertex, VertexSchema};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Room {
    pub id: String,
    pub sessionize_id: String,
    pub event_id: String,
    pub name: String,
    pub sort_order: i64,
    pub notes: String,
}

impl Vertex for Room {
    fn schema() -> VertexSchema {
        VertexSchema::new("Room")
            .label("room")
            .field("sessionize_id", FieldType::String)
            .field("event_id", FieldType::String)
            .field("name", FieldType::String)
            .field("sort_order", FieldType::Int)
            .bind(PropertyBinding::new("notes", FieldType::String).exclude_from_graph())
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn get(&self, field: &str) -> Option<PropertyValue> {
        match field {
            "sessionize_id" => Some(self.sessionize_id.clone().into()),
            "event_id" => Some(self.event_id.clone().into()),
            "name" => Some(self.name.clone().into()),
            "sort_order" => Some(self.sort_order.into()),
            "notes" => Some(self.notes.clone().into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: PropertyValue) -> Result<(), MapperError> {
        match field {
            "sessionize_id" => self.sessionize_id = value.cast("Room", field)?,
            "event_id" => self.event_id = value.cast("Room", field)?,
            "name" => self.name = value.cast("Room", field)?,
            "sort_order" => self.sort_order = value.cast("Room", field)?,
            "notes" => self.notes = value.cast("Room", field)?,
            _ => return Err(MapperError::unknown_field("Room", field)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub level: i64,
    pub speaker_names: Vec<String>,
    pub starts_at: Option<DateTime<Utc>>,
}

impl Vertex for Session {
    fn schema() -> VertexSchema {
        VertexSchema::new("Session")
            .label("session")
            .bind(PropertyBinding::new("title", FieldType::String).required())
            .field("level", FieldType::Int)
            .field("speaker_names", FieldType::list(FieldType::String))
            .field("starts_at", FieldType::DateTime)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn get(&self, field: &str) -> Option<PropertyValue> {
        match field {
            "title" => Some(self.title.clone().into()),
            "level" => Some(self.level.into()),
            "speaker_names" => Some(self.speaker_names.clone().into()),
            "starts_at" => Some(self.starts_at.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: PropertyValue) -> Result<(), MapperError> {
        match field {
            "title" => self.title = value.cast("Session", field)?,
            "level" => self.level = value.cast("Session", field)?,
            "speaker_names" => self.speaker_names = value.cast("Session", field)?,
            "starts_at" => self.starts_at = value.cast("Session", field)?,
            _ => return Err(MapperError::unknown_field("Session", field)),
        }
        Ok(())
    }
}
