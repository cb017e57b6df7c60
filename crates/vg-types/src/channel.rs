use crate::types::LogEvent;
use serde::{Deserialize, Serialize};

/// Messages the push channel delivers to a subscribed client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelMessage {
    /// Live validation outcome for one stored event.
    ValidationUpdate { app_id: String, log: Box<LogEvent> },
    /// Acknowledgment of a room join.
    Joined { app_id: String },
    /// Acknowledgment of a room leave.
    Left { app_id: String },
}

/// Messages a client sends on the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { app_id: String },
    Leave { app_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_validation_update() {
        let message: ChannelMessage = serde_json::from_value(json!({
            "type": "validation_update",
            "app_id": "app-7",
            "log": {
                "created_at": "2026-03-01T08:30:00Z",
                "event_name": "login",
                "payload": {"eventid": 0},
                "validation_results": [
                    {"key": "user_id", "validationStatus": "Valid"}
                ]
            }
        }))
        .unwrap();
        let ChannelMessage::ValidationUpdate { app_id, log } = message else {
            panic!("expected validation_update");
        };
        assert_eq!(app_id, "app-7");
        assert_eq!(log.event_name, "login");
        assert_eq!(log.validation_results.unwrap().len(), 1);
    }

    #[test]
    fn join_encodes_with_type_tag() {
        let encoded = serde_json::to_value(ClientMessage::Join {
            app_id: "app-7".to_string(),
        })
        .unwrap();
        assert_eq!(encoded, json!({"type": "join", "app_id": "app-7"}));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let result: Result<ChannelMessage, _> =
            serde_json::from_value(json!({"type": "heartbeat"}));
        assert!(result.is_err());
    }
}
