use serde_json::Value;
use vg_types::LogEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    User,
    System,
}

/// Classify an event as user-triggered or system-generated.
///
/// The marker is an `eventId` field equal to numeric or string zero. It is
/// looked up first among the event's validation results (by key,
/// case-insensitively), then in the raw payload. An absent marker
/// classifies as a user event; that default is part of the contract.
pub fn classify(event: &LogEvent) -> EventKind {
    match event_id(event) {
        Some(value) if is_zero(&value) => EventKind::User,
        Some(_) => EventKind::System,
        None => EventKind::User,
    }
}

fn event_id(event: &LogEvent) -> Option<Value> {
    if let Some(results) = &event.validation_results {
        let from_results = results
            .iter()
            .find(|row| row.key.eq_ignore_ascii_case("eventid"))
            .map(|row| row.value.clone());
        if let Some(value) = non_null(from_results) {
            return Some(value);
        }
    }
    non_null(payload_field(&event.payload, "eventid"))
}

fn payload_field(payload: &Value, key: &str) -> Option<Value> {
    match payload {
        Value::Object(map) => map
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.clone()),
        // Some producers double-encode the payload as a JSON string.
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !value.is_null())
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Number(number) => {
            number.as_i64() == Some(0)
                || number.as_u64() == Some(0)
                || number.as_f64() == Some(0.0)
        }
        Value::String(raw) => raw == "0",
        _ => false,
    }
}
