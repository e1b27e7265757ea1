//! Conversion between wire text, typed property values, and statement
//! literals.
//!
//! Both directions are locale-independent: numbers go through Rust's own
//! parsers and `Display`, date-times through RFC 3339.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::MapperError;
use crate::schema::FieldType;

// ── Values ────────────────────────────────────────────────────────

/// A typed property value as held by a vertex field.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Byte(u8),
    DateTime(DateTime<Utc>),
    String(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Byte(_) => "byte",
            Self::DateTime(_) => "datetime",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }

    /// Value equality for change detection: NaN equals NaN, and lists
    /// compare element-wise in order.
    pub fn same_as(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (a, b) => a == b,
        }
    }

    /// Convert into a concrete field type, naming the entity and field on
    /// mismatch.
    pub fn cast<T: FromPropertyValue>(self, entity: &str, field: &str) -> Result<T, MapperError> {
        let found = self.kind_name();
        T::from_value(self).ok_or_else(|| MapperError::FieldTypeMismatch {
            entity: entity.to_string(),
            field: field.to_string(),
            expected: T::EXPECTED,
            found,
        })
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u8> for PropertyValue {
    fn from(v: u8) -> Self {
        Self::Byte(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Extraction of a concrete Rust type from a [`PropertyValue`].
pub trait FromPropertyValue: Sized {
    /// Type name reported in mismatch errors.
    const EXPECTED: &'static str;

    fn from_value(value: PropertyValue) -> Option<Self>;
}

impl FromPropertyValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromPropertyValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FromPropertyValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(i) => Some(i),
            PropertyValue::Byte(b) => Some(i64::from(b)),
            _ => None,
        }
    }
}

impl FromPropertyValue for i32 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: PropertyValue) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromPropertyValue for u8 {
    const EXPECTED: &'static str = "byte";

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Byte(b) => Some(b),
            PropertyValue::Int(i) => u8::try_from(i).ok(),
            _ => None,
        }
    }
}

impl FromPropertyValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(f) => Some(f),
            PropertyValue::Int(i) => Some(i as f64),
            PropertyValue::Byte(b) => Some(f64::from(b)),
            _ => None,
        }
    }
}

impl FromPropertyValue for DateTime<Utc> {
    const EXPECTED: &'static str = "datetime";

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl<T: FromPropertyValue> FromPropertyValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::List(items) => items.into_iter().map(T::from_value).collect(),
            PropertyValue::Null => Some(Vec::new()),
            scalar => T::from_value(scalar).map(|v| vec![v]),
        }
    }
}

impl<T: FromPropertyValue> FromPropertyValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// ── Decoding ──────────────────────────────────────────────────────

/// A wire value that could not be parsed as its declared type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot decode {value:?} as {target}: {reason}")]
pub struct DecodeError {
    pub value: String,
    pub target: FieldType,
    pub reason: String,
}

impl DecodeError {
    fn new(value: &str, target: &FieldType, reason: impl ToString) -> Self {
        Self {
            value: value.to_string(),
            target: target.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Parse one wire value as `target`.
///
/// A list target decodes `wire` as a single element.
pub fn decode(wire: &str, target: &FieldType) -> Result<PropertyValue, DecodeError> {
    match target {
        FieldType::String => Ok(PropertyValue::String(wire.to_string())),
        FieldType::Bool => {
            let trimmed = wire.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(PropertyValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(PropertyValue::Bool(false))
            } else {
                Err(DecodeError::new(wire, target, "expected true or false"))
            }
        }
        FieldType::Int => wire
            .trim()
            .parse::<i64>()
            .map(PropertyValue::Int)
            .map_err(|e| DecodeError::new(wire, target, e)),
        FieldType::Float => wire
            .trim()
            .parse::<f64>()
            .map(PropertyValue::Float)
            .map_err(|e| DecodeError::new(wire, target, e)),
        FieldType::Byte => wire
            .trim()
            .parse::<u8>()
            .map(PropertyValue::Byte)
            .map_err(|e| DecodeError::new(wire, target, e)),
        FieldType::DateTime => parse_datetime(wire.trim())
            .map(PropertyValue::DateTime)
            .ok_or_else(|| DecodeError::new(wire, target, "expected an RFC 3339 timestamp")),
        FieldType::List(element) => decode(wire, element).map(|v| PropertyValue::List(vec![v])),
        FieldType::Unsupported(_) => Err(DecodeError::new(
            wire,
            target,
            "type has no wire representation",
        )),
    }
}

/// Decode every value as the element type of `target`, preserving order.
pub fn decode_list(values: &[String], target: &FieldType) -> Result<PropertyValue, DecodeError> {
    let element = target.element();
    values
        .iter()
        .map(|v| decode(v, element))
        .collect::<Result<Vec<_>, _>>()
        .map(PropertyValue::List)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Offset-less timestamps are taken as UTC.
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// ── Encoding ──────────────────────────────────────────────────────

/// Render a scalar as a statement literal.
///
/// Returns `None` for values that must not be written: `Null`, blank
/// strings, and lists (callers render lists element by element).
pub fn encode(value: &PropertyValue) -> Option<String> {
    match value {
        PropertyValue::Null | PropertyValue::List(_) => None,
        PropertyValue::Bool(b) => Some(b.to_string()),
        PropertyValue::Int(i) => Some(i.to_string()),
        PropertyValue::Byte(b) => Some(b.to_string()),
        PropertyValue::Float(f) if f.is_finite() => Some(f.to_string()),
        PropertyValue::Float(f) => Some(quote(&f.to_string())),
        PropertyValue::DateTime(dt) => {
            Some(quote(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
        }
        PropertyValue::String(s) if s.trim().is_empty() => None,
        PropertyValue::String(s) => Some(quote(s)),
    }
}

/// Render every writable literal of a value: one per list element, or at
/// most one for a scalar.
pub fn encode_all(value: &PropertyValue) -> Vec<String> {
    match value {
        PropertyValue::List(items) => items.iter().filter_map(encode).collect(),
        scalar => encode(scalar).into_iter().collect(),
    }
}

/// Single-quote `s`, backslash-escaping `\` and `'`.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
