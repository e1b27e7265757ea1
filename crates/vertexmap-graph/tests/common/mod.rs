//! Shared fixtures for the integration tests: a scripted in-memory
//! transport and two vertex types.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use vertexmap_core::{FieldType, MapperError, PropertyBinding, PropertyValue, Vertex, VertexSchema};
use vertexmap_graph::{GraphClient, RawRecord, ResultSet, Transport};

// ── Transport ────────────────────────────────────────────────────

/// Records every submitted statement and answers from a queue of scripted
/// replies; an empty queue answers with an empty result set.
#[derive(Default)]
pub struct ScriptedTransport {
    submitted: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<anyhow::Result<ResultSet>>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply_with(&self, records: Vec<Value>) {
        let records = records
            .into_iter()
            .map(|r| RawRecord::from_json(r).unwrap())
            .collect();
        self.push(Ok(ResultSet::new(records)));
    }

    pub fn reply_with_attributes(&self, attributes: Map<String, Value>) {
        self.push(Ok(ResultSet::default().with_status_attributes(attributes)));
    }

    pub fn ok(&self) {
        self.push(Ok(ResultSet::default()));
    }

    pub fn fail(&self, message: &str) {
        self.push(Err(anyhow::anyhow!(message.to_string())));
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    fn push(&self, reply: anyhow::Result<ResultSet>) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(&self, statement: &str) -> anyhow::Result<ResultSet> {
        self.submitted.lock().unwrap().push(statement.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ResultSet::default()))
    }
}

pub fn client(transport: &Arc<ScriptedTransport>) -> GraphClient {
    init_tracing();
    GraphClient::with_defaults(transport.clone())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("vertexmap_graph=debug,vertexmap_core=debug")
        .with_test_writer()
        .try_init();
}

// ── Server side ──────────────────────────────────────────────────

/// Read a `create('<label>')[.property('<key>',<literal>)]*` statement back
/// into its label and clause values, as a server would store them.
pub fn parse_create(statement: &str) -> (String, Vec<(String, Value)>) {
    let mut chars = statement
        .strip_prefix("create(")
        .expect("create statement")
        .chars()
        .peekable();
    let label = read_quoted(&mut chars);
    assert_eq!(chars.next(), Some(')'));

    let mut clauses = Vec::new();
    while chars.peek().is_some() {
        let head: String = chars.by_ref().take(".property(".len()).collect();
        assert_eq!(head, ".property(");
        let key = read_quoted(&mut chars);
        assert_eq!(chars.next(), Some(','));
        let value = if chars.peek() == Some(&'\'') {
            Value::String(read_quoted(&mut chars))
        } else {
            let raw: String = std::iter::from_fn(|| chars.next_if(|&c| c != ')')).collect();
            serde_json::from_str(&raw).expect("number or boolean literal")
        };
        assert_eq!(chars.next(), Some(')'));
        clauses.push((key, value));
    }
    (label, clauses)
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> String {
    assert_eq!(chars.next(), Some('\''));
    let mut out = String::new();
    loop {
        match chars.next().expect("unterminated literal") {
            '\\' => out.push(chars.next().expect("dangling escape")),
            '\'' => return out,
            c => out.push(c),
        }
    }
}

/// The wire record a server returns for a vertex stored from `clauses`.
pub fn stored_record(label: &str, id_key: &str, clauses: Vec<(String, Value)>) -> Value {
    let mut id = Value::Null;
    let mut properties = Map::new();
    for (n, (key, value)) in clauses.into_iter().enumerate() {
        if key == id_key {
            id = value;
            continue;
        }
        let slot = properties.entry(key).or_insert_with(|| json!([]));
        if let Value::Array(items) = slot {
            items.push(json!({"id": format!("p{n}"), "value": value}));
        }
    }
    json!({"id": id, "label": label, "type": "vertex", "properties": properties})
}

// ── Vertex types ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Room {
    pub id: String,
    pub sessionize_id: String,
    pub event_id: String,
    pub name: String,
    pub sort_order: i64,
}

impl Vertex for Room {
    fn schema() -> VertexSchema {
        VertexSchema::new("Room")
            .label("room")
            .description("A room sessions are held in")
            .field("sessionize_id", FieldType::String)
            .field("event_id", FieldType::String)
            .field("name", FieldType::String)
            .field("sort_order", FieldType::Int)
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
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: PropertyValue) -> Result<(), MapperError> {
        match field {
            "sessionize_id" => self.sessionize_id = value.cast("Room", field)?,
            "event_id" => self.event_id = value.cast("Room", field)?,
            "name" => self.name = value.cast("Room", field)?,
            "sort_order" => self.sort_order = value.cast("Room", field)?,
            _ => return Err(MapperError::unknown_field("Room", field)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Speaker {
    pub id: String,
    pub full_name: String,
    pub is_top_speaker: bool,
    pub rating: f64,
    pub tag_line: String,
    pub categories: Vec<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Vertex for Speaker {
    fn schema() -> VertexSchema {
        VertexSchema::new("Speaker")
            .label("speaker")
            .bind(PropertyBinding::new("full_name", FieldType::String).required())
            .field("is_top_speaker", FieldType::Bool)
            .field("rating", FieldType::Float)
            .property("tagline", "tag_line", FieldType::String)
            .field("categories", FieldType::list(FieldType::String))
            .field("joined_at", FieldType::DateTime)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn get(&self, field: &str) -> Option<PropertyValue> {
        match field {
            "full_name" => Some(self.full_name.clone().into()),
            "is_top_speaker" => Some(self.is_top_speaker.into()),
            "rating" => Some(self.rating.into()),
            "tag_line" => Some(self.tag_line.clone().into()),
            "categories" => Some(self.categories.clone().into()),
            "joined_at" => Some(self.joined_at.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: PropertyValue) -> Result<(), MapperError> {
        match field {
            "full_name" => self.full_name = value.cast("Speaker", field)?,
            "is_top_speaker" => self.is_top_speaker = value.cast("Speaker", field)?,
            "rating" => self.rating = value.cast("Speaker", field)?,
            "tag_line" => self.tag_line = value.cast("Speaker", field)?,
            "categories" => self.categories = value.cast("Speaker", field)?,
            "joined_at" => self.joined_at = value.cast("Speaker", field)?,
            _ => return Err(MapperError::unknown_field("Speaker", field)),
        }
        Ok(())
    }
}
