//! Result decoding: raw wire records → [`NormalizedRecord`].
//!
//! Property payloads arrive as lists of small objects such as
//! `[{"id":"5f1c…","value":"Corina"}]`. Each payload is re-serialized and
//! split on commas outside quoted spans; every second token carries a value.

use std::str::Chars;

use serde_json::Value;

use vertexmap_core::{NormalizedRecord, RecordKind};

use crate::client::{GraphError, RawRecord};

/// Quote-free form of the `"value":` key that starts every value token.
const VALUE_PREFIX: &str = "value:";

/// Decode every record of a result set, in order.
pub fn decode_records(records: &[RawRecord]) -> Result<Vec<NormalizedRecord>, GraphError> {
    records.iter().map(decode_record).collect()
}

/// Decode one raw record. Unknown top-level keys are ignored.
pub fn decode_record(raw: &RawRecord) -> Result<NormalizedRecord, GraphError> {
    let mut record = NormalizedRecord::default();

    for (key, value) in raw.fields() {
        match key.as_str() {
            "id" => record.id = identifier_text(value)?,
            "label" => record.label = text_field("label", value)?,
            "type" => record.kind = RecordKind::from_wire(&text_field("type", value)?),
            "properties" => decode_properties(value, &mut record)?,
            _ => {}
        }
    }

    tracing::trace!(
        id = %record.id,
        label = %record.label,
        kind = ?record.kind,
        properties = record.properties.len(),
        "Decoded record"
    );
    Ok(record)
}

fn identifier_text(value: &Value) -> Result<String, GraphError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(GraphError::MalformedRecord(format!(
            "id must be a string or number, got {other}"
        ))),
    }
}

fn text_field(name: &str, value: &Value) -> Result<String, GraphError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(GraphError::MalformedRecord(format!(
            "{name} must be a string, got {other}"
        ))),
    }
}

fn decode_properties(value: &Value, record: &mut NormalizedRecord) -> Result<(), GraphError> {
    let properties = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(()),
        other => {
            return Err(GraphError::MalformedRecord(format!(
                "properties must be an object, got {other}"
            )))
        }
    };

    for (key, payload) in properties {
        for text in property_values(payload)? {
            record.push_value(key.as_str(), text);
        }
    }
    Ok(())
}

/// All values carried by one property payload, in wire order.
pub fn property_values(payload: &Value) -> Result<Vec<String>, GraphError> {
    let text = serde_json::to_string(payload)?;
    Ok(extract_values(&text))
}

/// Pull the value tokens out of serialized payload text.
pub fn extract_values(text: &str) -> Vec<String> {
    split_quoted(text)
        .iter()
        .skip(1)
        .step_by(2)
        .filter_map(|token| strip_value_token(token))
        .map(unescape)
        .collect()
}

fn strip_value_token(token: &str) -> Option<&str> {
    let Some(rest) = token.strip_prefix(VALUE_PREFIX) else {
        tracing::warn!(token, "Skipping property token without a value key");
        return None;
    };
    let rest = rest
        .strip_suffix("}]")
        .or_else(|| rest.strip_suffix('}'))
        .unwrap_or(rest);
    Some(rest)
}

/// Split on commas that are not inside a double-quoted span.
///
/// Quote characters are dropped. Inside quotes a backslash and the
/// character after it are copied as-is, so `\"` never ends the span.
pub fn split_quoted(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    if input.is_empty() {
        return tokens;
    }

    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ',' if !in_quotes => tokens.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    tokens.push(current);
    tokens
}

/// Resolve JSON backslash escapes. Malformed sequences are kept verbatim.
pub fn unescape(input: &str) -> String {
    if !input.contains('\\') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => match read_hex4(&mut chars) {
                Some(high) if (0xD800..0xDC00).contains(&high) => {
                    out.push(read_low_surrogate(&mut chars, high).unwrap_or('\u{FFFD}'));
                }
                Some(code) => out.push(char::from_u32(code).unwrap_or('\u{FFFD}')),
                None => out.push_str("\\u"),
            },
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Read four hex digits, consuming nothing on failure.
fn read_hex4(chars: &mut Chars<'_>) -> Option<u32> {
    let mut ahead = chars.clone();
    let mut code = 0;
    for _ in 0..4 {
        code = code * 16 + ahead.next()?.to_digit(16)?;
    }
    *chars = ahead;
    Some(code)
}

fn read_low_surrogate(chars: &mut Chars<'_>, high: u32) -> Option<char> {
    let mut ahead = chars.clone();
    if ahead.next()? != '\\' || ahead.next()? != 'u' {
        return None;
    }
    let low = read_hex4(&mut ahead)?;
    if !(0xDC00..0xE000).contains(&low) {
        return None;
    }
    *chars = ahead;
    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}
