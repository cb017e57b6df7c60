use chrono::{DateTime, Utc};
use serde_json::Value;
use vg_types::ValidationResult;

/// One row of the user-event table: a header per event followed by one
/// row per validated field.
#[derive(Debug, Clone, PartialEq)]
pub enum UserRow {
    Header { timestamp: String, event_name: String },
    Field(ValidationResult),
}

/// One row of the system-event table.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemRow {
    pub timestamp: String,
    pub event_name: String,
    pub message: String,
}

pub fn display_timestamp(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}

/// Render a payload value for display and substring matching. Strings are
/// shown bare, null as the empty string, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Rows for one live user event: header first, fields in arrival order.
pub fn user_rows_for_event(
    timestamp: &str,
    event_name: &str,
    results: &[ValidationResult],
) -> Vec<UserRow> {
    let mut rows = Vec::with_capacity(results.len() + 1);
    rows.push(UserRow::Header {
        timestamp: timestamp.to_string(),
        event_name: event_name.to_string(),
    });
    rows.extend(results.iter().cloned().map(UserRow::Field));
    rows
}

/// Re-render the user table for a filtered result set: one header per
/// `(event name, timestamp)` group, groups ordered by timestamp
/// descending, members in the order they appear in `results`.
pub fn grouped_user_rows(results: &[ValidationResult]) -> Vec<UserRow> {
    let mut groups: Vec<((String, String), Vec<ValidationResult>)> = Vec::new();
    for row in results {
        let key = (row.event_name.clone(), row.timestamp.clone());
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(row.clone()),
            None => groups.push((key, vec![row.clone()])),
        }
    }
    // Display timestamps sort lexicographically in chronological order.
    groups.sort_by(|(a, _), (b, _)| b.1.cmp(&a.1));

    let mut rows = Vec::new();
    for ((event_name, timestamp), members) in groups {
        rows.push(UserRow::Header {
            timestamp,
            event_name,
        });
        rows.extend(members.into_iter().map(UserRow::Field));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(event: &str, timestamp: &str, key: &str) -> ValidationResult {
        serde_json::from_value(json!({
            "timestamp": timestamp,
            "eventName": event,
            "key": key,
            "validationStatus": "Valid"
        }))
        .unwrap()
    }

    #[test]
    fn live_rows_keep_field_order_under_header() {
        let results = vec![row("login", "2026-03-01 08:00:00", "a"), row("login", "2026-03-01 08:00:00", "b")];
        let rows = user_rows_for_event("2026-03-01 08:00:00", "login", &results);
        assert!(matches!(&rows[0], UserRow::Header { event_name, .. } if event_name == "login"));
        assert!(matches!(&rows[1], UserRow::Field(field) if field.key == "a"));
        assert!(matches!(&rows[2], UserRow::Field(field) if field.key == "b"));
    }

    #[test]
    fn grouping_orders_by_timestamp_descending() {
        let results = vec![
            row("login", "2026-03-01 08:00:00", "a"),
            row("logout", "2026-03-01 09:00:00", "b"),
            row("login", "2026-03-01 08:00:00", "c"),
        ];
        let rows = grouped_user_rows(&results);
        assert_eq!(
            rows,
            vec![
                UserRow::Header {
                    timestamp: "2026-03-01 09:00:00".to_string(),
                    event_name: "logout".to_string()
                },
                UserRow::Field(results[1].clone()),
                UserRow::Header {
                    timestamp: "2026-03-01 08:00:00".to_string(),
                    event_name: "login".to_string()
                },
                UserRow::Field(results[0].clone()),
                UserRow::Field(results[2].clone()),
            ]
        );
    }

    #[test]
    fn value_display_is_bare_for_strings_and_empty_for_null() {
        assert_eq!(display_value(&json!("abc")), "abc");
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&json!(12.5)), "12.5");
        assert_eq!(display_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn missing_timestamp_displays_placeholder() {
        assert_eq!(display_timestamp(None), "N/A");
    }
}
