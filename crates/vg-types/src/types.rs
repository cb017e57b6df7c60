use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-field validation outcome. The wire strings are fixed by the server;
/// anything it starts emitting that we do not know folds into `Unknown`
/// and renders as `N/A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    EmptyValue,
    NotPresent,
    ExtraKey,
    ExtraEvent,
    ExtraEventPayload,
    Unknown,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Invalid => "Invalid/Wrong datatype/value",
            Self::EmptyValue => "Payload value is Empty",
            Self::NotPresent => "Payload not present in the log",
            Self::ExtraKey => "Extra key present in the log",
            Self::ExtraEvent => "Extra event (not in sheet)",
            Self::ExtraEventPayload => "Payload from extra event",
            Self::Unknown => "N/A",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl Default for ValidationStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ValidationStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Valid" => Self::Valid,
            "Invalid/Wrong datatype/value" => Self::Invalid,
            // "Null value" is the legacy spelling still produced by older
            // validator deployments.
            "Payload value is Empty" | "Null value" => Self::EmptyValue,
            "Payload not present in the log" => Self::NotPresent,
            "Extra key present in the log" => Self::ExtraKey,
            "Extra event (not in sheet)" => Self::ExtraEvent,
            "Payload from extra event" => Self::ExtraEventPayload,
            _ => Self::Unknown,
        }
    }
}

impl From<ValidationStatus> for String {
    fn from(value: ValidationStatus) -> Self {
        value.as_str().to_string()
    }
}

/// One row of a single field's validation outcome. Rows arriving inside a
/// `LogEvent` carry no timestamp; the view fills it from the owning event
/// before the row enters the rolling buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default = "placeholder")]
    pub expected_type: String,
    #[serde(default = "placeholder")]
    pub received_type: String,
    #[serde(default)]
    pub validation_status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn placeholder() -> String {
    "N/A".to_string()
}

/// A stored log event, delivered by the push channel or fetched in pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(default, alias = "timestamp", with = "crate::time::flexible")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "eventName")]
    pub event_name: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_results: Option<Vec<ValidationResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogsPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub logs: Vec<LogEvent>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub valid: u64,
    #[serde(default)]
    pub invalid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    #[serde(default)]
    pub captured: u64,
    #[serde(default)]
    pub missing: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub missing_events: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNames {
    #[serde(default)]
    pub event_names: Vec<String>,
}

/// Response of the bulk delete endpoint. The backend answers either
/// `{success, deleted}` or `{error}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub deleted: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_round_trips_wire_strings() {
        for raw in [
            "Valid",
            "Invalid/Wrong datatype/value",
            "Payload value is Empty",
            "Extra key present in the log",
            "Payload not present in the log",
            "Extra event (not in sheet)",
            "Payload from extra event",
        ] {
            let status: ValidationStatus = serde_json::from_value(json!(raw)).unwrap();
            assert_eq!(serde_json::to_value(status).unwrap(), json!(raw));
        }
    }

    #[test]
    fn unknown_status_folds_to_placeholder() {
        let status: ValidationStatus = serde_json::from_value(json!("Exploded")).unwrap();
        assert_eq!(status, ValidationStatus::Unknown);
        assert_eq!(status.as_str(), "N/A");
    }

    #[test]
    fn legacy_null_value_maps_to_empty() {
        let status: ValidationStatus = serde_json::from_value(json!("Null value")).unwrap();
        assert_eq!(status, ValidationStatus::EmptyValue);
    }

    #[test]
    fn result_tolerates_missing_fields() {
        let result: ValidationResult = serde_json::from_value(json!({
            "key": "user_id",
            "validationStatus": "Valid"
        }))
        .unwrap();
        assert_eq!(result.key, "user_id");
        assert_eq!(result.expected_type, "N/A");
        assert_eq!(result.received_type, "N/A");
        assert_eq!(result.value, Value::Null);
        assert!(result.comment.is_none());
    }

    #[test]
    fn log_event_accepts_timestamp_alias() {
        let event: LogEvent = serde_json::from_value(json!({
            "timestamp": "2026-03-01 08:30:00",
            "event_name": "login",
            "payload": {"eventid": 0}
        }))
        .unwrap();
        assert!(event.created_at.is_some());
        assert_eq!(event.event_name, "login");
    }

    #[test]
    fn log_event_tolerates_bad_timestamp() {
        let event: LogEvent = serde_json::from_value(json!({
            "created_at": "not a time",
            "event_name": "login"
        }))
        .unwrap();
        assert!(event.created_at.is_none());
    }

    #[test]
    fn delete_outcome_decodes_both_shapes() {
        let ok: DeleteOutcome =
            serde_json::from_value(json!({"success": true, "deleted": 12})).unwrap();
        assert!(ok.success);
        assert_eq!(ok.deleted, 12);

        let failed: DeleteOutcome =
            serde_json::from_value(json!({"error": "database locked"})).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("database locked"));
    }
}
