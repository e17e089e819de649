//! Locating and parsing the structured part of a model reply.

use serde_json::Value;

/// Outcome of looking for a goal list inside a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The reply carried a `goals` array; entries are still unvalidated.
    Goals(Vec<Value>),
    /// Nothing usable was found. Carries why, for logging.
    Conversational(&'static str),
}

/// Slice between the first `{` and the last `}`, inclusive.
pub fn locate_payload(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&reply[start..=end])
}

/// Classifies a raw model reply.
pub fn parse_payload(reply: &str) -> Payload {
    let Some(candidate) = locate_payload(reply) else {
        return Payload::Conversational("no braced payload");
    };

    let mut document: Value = match serde_json::from_str(candidate) {
        Ok(document) => document,
        Err(_) => return Payload::Conversational("payload is not valid JSON"),
    };

    match document.get_mut("goals").map(Value::take) {
        Some(Value::Array(entries)) => Payload::Goals(entries),
        Some(_) => Payload::Conversational("goals is not a list"),
        None => Payload::Conversational("no goals key"),
    }
}
