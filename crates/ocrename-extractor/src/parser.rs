//! Parse language-model replies into records

use ocrename_domain::{ExtractedRecord, IdType};
use serde_json::{Deserializer, Map, Value};
use tracing::{debug, warn};

/// Parse a model reply into a record.
///
/// The JSON object may be wrapped in a fenced code block or surrounded by
/// prose. Returns `None` when the reply holds no JSON object at all. Null
/// values and the literal strings "null"/"none" become absent fields;
/// numbers are reduced to their digits.
pub fn parse_ai_reply(reply: &str) -> Option<ExtractedRecord> {
    let Some(object) = fenced_object(reply).or_else(|| embedded_object(reply)) else {
        warn!("No JSON object found in model reply");
        debug!("Reply without JSON: {}", reply);
        return None;
    };

    let record = ExtractedRecord {
        id_type: text_value(&object, "id_type").and_then(|t| IdType::parse(&t)),
        id_number: text_value(&object, "id_number").and_then(digits_only),
        acta_no: text_value(&object, "acta_no").and_then(digits_only),
    };
    debug!("Parsed model reply: {}", record);
    Some(record)
}

/// Object inside a ```json fence
fn fenced_object(reply: &str) -> Option<Map<String, Value>> {
    let start = reply.find("```json")? + "```json".len();
    let end = reply[start..].find("```")? + start;
    match serde_json::from_str::<Value>(reply[start..end].trim()) {
        Ok(Value::Object(object)) => Some(object),
        Ok(_) => None,
        Err(e) => {
            debug!("Fenced block is not valid JSON: {}", e);
            None
        }
    }
}

/// First parseable object starting at any '{' of the reply
fn embedded_object(reply: &str) -> Option<Map<String, Value>> {
    reply.match_indices('{').find_map(|(index, _)| {
        let mut stream = Deserializer::from_str(&reply[index..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(object))) => Some(object),
            _ => None,
        }
    })
}

fn text_value(object: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.as_u64().map(|v| v.to_string()).unwrap_or_else(|| n.to_string()),
        _ => return None,
    };
    if text.is_empty() || text.eq_ignore_ascii_case("null") || text.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(text)
    }
}

fn digits_only(value: String) -> Option<String> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}
