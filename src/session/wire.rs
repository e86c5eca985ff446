use serde::{Deserialize, Serialize};

use super::config::SessionConfig;

/// Messages a client sends over the streaming connection. Each WebSocket
/// text frame carries exactly one, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Set or replace the session configuration.
    Config {
        #[serde(default)]
        source_language: Option<String>,
        target_language: String,
    },
    /// Append a compressed audio fragment to the session buffer.
    Chunk { encoding: String, data: String },
    /// Force a final processing pass and response.
    Flush,
    /// Terminate the session. Buffered audio is discarded, not flushed.
    Close,
}

/// Messages the server sends back, in strict per-session order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Configuration accepted; echoes the effective values.
    ConfigAck { config: SessionConfig },
    /// Partial result from a threshold-triggered pass.
    Interim {
        text: String,
        detected_language: String,
    },
    /// Authoritative result of a flush.
    Final {
        original_text: String,
        translated_text: String,
        detected_language: String,
        target_language: String,
    },
    /// Non-fatal processing or validation failure; the session stays open.
    Error { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_message_parses_with_null_source() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"config","source_language":null,"target_language":"ar"}"#)
                .unwrap();
        match msg {
            ClientMessage::Config {
                source_language,
                target_language,
            } => {
                assert!(source_language.is_none());
                assert_eq!(target_language, "ar");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn chunk_message_round_trips() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"chunk","encoding":"base64","data":"AAAA"}"#).unwrap();
        match &msg {
            ClientMessage::Chunk { encoding, data } => {
                assert_eq!(encoding, "base64");
                assert_eq!(data, "AAAA");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn flush_and_close_are_bare_tags() {
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"flush"}"#).unwrap(),
            ClientMessage::Flush
        ));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"close"}"#).unwrap(),
            ClientMessage::Close
        ));
    }

    #[test]
    fn final_message_serializes_with_wire_field_names() {
        let msg = ServerMessage::Final {
            original_text: "hello world".to_string(),
            translated_text: "مرحبا بالعالم".to_string(),
            detected_language: "en".to_string(),
            target_language: "ar".to_string(),
        };

        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "final");
        assert_eq!(json["original_text"], "hello world");
        assert_eq!(json["detected_language"], "en");
        assert_eq!(json["target_language"], "ar");
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"register"}"#).is_err());
    }
}
